// ABOUTME: Workflow execution engine module for taskmill
// ABOUTME: Drives tasks through their status sequences and handles failures

pub mod context;
pub mod error;
pub mod manager;

pub use context::WorkflowContext;
pub use error::{EngineError, Result};
pub use manager::TaskManager;
