// ABOUTME: Main library module for the taskmill workflow engine
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod engine;
pub mod store;
pub mod task;
pub mod workflow;

// Re-export commonly used types
pub use engine::{EngineError, TaskManager, WorkflowContext};
pub use store::{MemoryTaskStore, PgTaskStore, StoreError, TaskQuery, TaskStore};
pub use task::{Task, NO_TIMEOUT, STATUS_CREATED, STATUS_ERROR};
pub use workflow::{default_workflow, Handler, WorkflowDefinition, WorkflowRegistry};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
