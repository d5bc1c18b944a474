// ABOUTME: Error types for workflow engine operations
// ABOUTME: Covers lookup, invalid-state, handler, and caller-misuse failures

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("task {id} could not be loaded: {source}")]
    TaskNotFound { id: i64, source: StoreError },

    #[error("no workflow registered for task type '{task_type}'")]
    UnknownTaskType { task_type: String },

    #[error("task {id} is in status '{status}'; only 'Created' tasks can be started")]
    NotStartable { id: i64, status: String },

    #[error("no status follows '{status}' in the workflow sequence; a terminate marker was expected earlier")]
    SequenceEnd { status: String },

    #[error("handler failed in status '{status}': {message}")]
    HandlerFailed { status: String, message: String },

    #[error("task {id} is in status '{status}', which does not suspend")]
    NotSuspended { id: i64, status: String },

    #[error("invalid wait outcome '{outcome}'; expected 'success' or 'error'")]
    InvalidOutcome { outcome: String },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
