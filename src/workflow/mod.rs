// ABOUTME: Workflow definition module for the taskmill engine
// ABOUTME: Defines status sequences, handler lists, and the per-type registry

pub mod default;
pub mod definition;
pub mod registry;

pub use default::default_workflow;
pub use definition::{Handler, HandlerFn, WorkflowDefinition};
pub use registry::{WorkflowFactory, WorkflowRegistry};
