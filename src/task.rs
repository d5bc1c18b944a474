// ABOUTME: Task entity definition for the taskmill workflow engine
// ABOUTME: Defines the persisted unit of work and its status constants

use serde::{Deserialize, Serialize};

/// Status every task is created in.
pub const STATUS_CREATED: &str = "Created";

/// Absorbing status a task jumps to when a handler or the engine fails.
pub const STATUS_ERROR: &str = "Error";

/// Timeout value meaning "no timeout".
pub const NO_TIMEOUT: i32 = -1;

/// A persisted unit of work moving through a workflow.
///
/// `status` is always either a member of the owning workflow's status
/// sequence or [`STATUS_ERROR`]. Apart from the jump to `Error`, status only
/// ever moves forward through the sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Primary key, assigned by storage on creation.
    pub id: i64,

    /// Caller-supplied correlation id, opaque to the engine.
    pub reference_id: String,

    pub task_group: String,

    /// Selects the workflow definition for this task.
    pub task_type: String,

    /// When true, a fresh task is created once this one's workflow ends.
    pub recurring: bool,

    pub status: String,

    /// Seconds the task may remain in its current status before an external
    /// sweep may consider it stale. Negative means no timeout; the engine
    /// sets this field but never enforces it.
    pub timeout: i32,

    /// Last diagnostic message, set on error.
    pub message: String,

    /// Opaque caller-defined payload, carried unmodified across transitions
    /// unless a handler replaces it.
    #[serde(default)]
    pub properties: Vec<u8>,
}

impl Task {
    pub fn new(reference_id: &str, task_group: &str, task_type: &str) -> Self {
        Self {
            reference_id: reference_id.to_string(),
            task_group: task_group.to_string(),
            task_type: task_type.to_string(),
            status: STATUS_CREATED.to_string(),
            timeout: NO_TIMEOUT,
            ..Self::default()
        }
    }

    pub fn recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    pub fn with_properties(mut self, properties: Vec<u8>) -> Self {
        self.properties = properties;
        self
    }

    /// Clamp sub-second timeouts to [`NO_TIMEOUT`]. Stores apply this on
    /// every create and update.
    pub fn normalize_timeout(&mut self) {
        if self.timeout < 1 {
            self.timeout = NO_TIMEOUT;
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "task {} [{}/{}] status={} ref={}",
            self.id, self.task_group, self.task_type, self.status, self.reference_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("ref-1", "reports", "default");

        assert_eq!(task.id, 0);
        assert_eq!(task.status, STATUS_CREATED);
        assert_eq!(task.timeout, NO_TIMEOUT);
        assert!(!task.recurring);
        assert!(task.properties.is_empty());
    }

    #[test]
    fn test_timeout_normalization() {
        let mut task = Task::new("ref-1", "reports", "default");

        task.timeout = 0;
        task.normalize_timeout();
        assert_eq!(task.timeout, NO_TIMEOUT);

        task.timeout = -42;
        task.normalize_timeout();
        assert_eq!(task.timeout, NO_TIMEOUT);

        task.timeout = 300;
        task.normalize_timeout();
        assert_eq!(task.timeout, 300);
    }

    #[test]
    fn test_recurring_builder() {
        let task = Task::new("ref-1", "reports", "default")
            .recurring()
            .with_properties(b"{\"key\":\"value\"}".to_vec());

        assert!(task.recurring);
        assert_eq!(task.properties, b"{\"key\":\"value\"}");
    }
}
