// ABOUTME: Registry mapping task types to workflow definition factories
// ABOUTME: An explicit object handed to the task manager at construction time

use std::collections::HashMap;
use std::sync::Arc;

use super::definition::WorkflowDefinition;

/// Produces a fresh [`WorkflowDefinition`] for each engine invocation.
pub type WorkflowFactory = Arc<dyn Fn() -> WorkflowDefinition + Send + Sync>;

/// Maps a task-type string to the factory that builds its workflow.
#[derive(Clone, Default)]
pub struct WorkflowRegistry {
    factories: HashMap<String, WorkflowFactory>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, task_type: &str, factory: F)
    where
        F: Fn() -> WorkflowDefinition + Send + Sync + 'static,
    {
        self.factories
            .insert(task_type.to_string(), Arc::new(factory));
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.factories.contains_key(task_type)
    }

    /// Build a fresh definition for `task_type`, or `None` when the type has
    /// no registered workflow.
    pub fn build(&self, task_type: &str) -> Option<WorkflowDefinition> {
        self.factories.get(task_type).map(|factory| factory())
    }

    pub fn registered_types(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for WorkflowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}
