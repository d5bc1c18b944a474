// ABOUTME: Error types for task storage operations
// ABOUTME: Covers lookup failures, database transport errors, and bad queries

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("task {id} not found")]
    NotFound { id: i64 },

    #[error("invalid query range: start {start} must not exceed end {end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
