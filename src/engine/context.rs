// ABOUTME: Per-invocation execution context for workflow handlers
// ABOUTME: Carries the live task cache and the original recurring definition

use crate::task::Task;

/// Execution state scoped to a single engine invocation.
///
/// The engine keeps `task` current as the workflow advances, so handlers
/// observe the latest state without re-reading storage. Handlers may mutate
/// `task.properties`; the engine persists whatever the cache holds on the
/// next transition.
#[derive(Debug)]
pub struct WorkflowContext {
    /// The task under mutation.
    pub task: Task,

    /// Snapshot of the task as it was loaded, kept so a recurring task can be
    /// re-submitted with its original definition once the workflow ends.
    recurring: Option<Task>,
}

impl WorkflowContext {
    pub fn new(task: Task) -> Self {
        let recurring = task.recurring.then(|| task.clone());
        Self { task, recurring }
    }

    pub fn recurring_definition(&self) -> Option<&Task> {
        self.recurring.as_ref()
    }
}
