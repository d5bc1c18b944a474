// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides shared functionality for building test managers and workflows

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use taskmill::store::{StoreError, TaskQuery, TaskStore};
use taskmill::{
    default_workflow, Handler, MemoryTaskStore, Task, TaskManager, WorkflowDefinition,
    WorkflowRegistry,
};

/// Builds a [`TaskManager`] over a fresh in-memory store with whatever
/// workflows a test registers.
pub struct TestManagerBuilder {
    registry: WorkflowRegistry,
    store: Arc<MemoryTaskStore>,
    strict_resume: bool,
}

impl TestManagerBuilder {
    pub fn new() -> Self {
        Self {
            registry: WorkflowRegistry::new(),
            store: Arc::new(MemoryTaskStore::new()),
            strict_resume: false,
        }
    }

    pub fn with_default_workflow(mut self) -> Self {
        self.registry.register("default", default_workflow);
        self
    }

    pub fn with_workflow<F>(mut self, task_type: &str, factory: F) -> Self
    where
        F: Fn() -> WorkflowDefinition + Send + Sync + 'static,
    {
        self.registry.register(task_type, factory);
        self
    }

    pub fn with_strict_resume(mut self) -> Self {
        self.strict_resume = true;
        self
    }

    pub fn store(&self) -> Arc<MemoryTaskStore> {
        Arc::clone(&self.store)
    }

    pub fn build(self) -> TaskManager {
        TaskManager::new(self.store, self.registry).with_strict_resume(self.strict_resume)
    }
}

/// A workflow whose statuses each bump a shared counter before advancing,
/// used to observe handler execution order and count.
pub fn counting_workflow(counter: Arc<AtomicUsize>) -> WorkflowDefinition {
    let bump = move || {
        let counter = Arc::clone(&counter);
        Handler::run(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    };

    WorkflowDefinition::new(vec!["Created", "Staged", "Applied", "Complete"])
        .with_timeout("Staged", 120)
        .with_handlers("Created", vec![bump(), Handler::Advance])
        .with_handlers("Staged", vec![bump(), Handler::Advance])
        .with_handlers("Applied", vec![bump(), Handler::Advance])
        .with_handlers("Complete", vec![bump(), Handler::Terminate])
}

pub fn default_task() -> Task {
    Task::new("ref-test", "reports", "default")
}

/// A store whose `update` starts failing once its allowance runs out, for
/// exercising persistence-failure handling. Every other operation delegates
/// to an in-memory store.
pub struct UpdateQuotaStore {
    inner: MemoryTaskStore,
    updates_left: AtomicUsize,
}

impl UpdateQuotaStore {
    pub fn new(allowed_updates: usize) -> Self {
        Self {
            inner: MemoryTaskStore::new(),
            updates_left: AtomicUsize::new(allowed_updates),
        }
    }
}

#[async_trait]
impl TaskStore for UpdateQuotaStore {
    async fn create(&self, task: Task) -> Result<Task, StoreError> {
        self.inner.create(task).await
    }

    async fn find(&self, id: i64) -> Result<Task, StoreError> {
        self.inner.find(id).await
    }

    async fn update(&self, task: &Task) -> Result<(), StoreError> {
        let allowed = self
            .updates_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok();
        if !allowed {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.update(task).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }

    async fn find_all(&self, query: TaskQuery) -> Result<Vec<Task>, StoreError> {
        self.inner.find_all(query).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.inner.count().await
    }
}

/// A manager with the default workflow over an arbitrary store.
pub fn manager_over(store: Arc<dyn TaskStore>) -> TaskManager {
    let mut registry = WorkflowRegistry::new();
    registry.register("default", default_workflow);
    TaskManager::new(store, registry)
}
