// ABOUTME: In-process task store backed by a shared map
// ABOUTME: Used by tests and library embedders that do not need a database

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::{Result, StoreError};
use super::{SortOrder, TaskColumn, TaskQuery, TaskStore};
use crate::task::{Task, STATUS_CREATED};

#[derive(Debug, Default)]
struct MemoryInner {
    tasks: HashMap<i64, Task>,
    next_id: i64,
}

/// A [`TaskStore`] holding every row in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, mut task: Task) -> Result<Task> {
        task.normalize_timeout();
        task.status = STATUS_CREATED.to_string();

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        task.id = inner.next_id;
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find(&self, id: i64) -> Result<Task> {
        let inner = self.inner.read().await;
        inner
            .tasks
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn update(&self, task: &Task) -> Result<()> {
        let mut row = task.clone();
        row.normalize_timeout();

        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&row.id) {
            Some(existing) => {
                *existing = row;
                Ok(())
            }
            None => Err(StoreError::NotFound { id: row.id }),
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { id })
    }

    async fn find_all(&self, query: TaskQuery) -> Result<Vec<Task>> {
        if let Some((start, end)) = query.range {
            if start > end {
                return Err(StoreError::InvalidRange { start, end });
            }
        }

        let inner = self.inner.read().await;
        let mut rows: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| matches_filters(t, &query))
            .cloned()
            .collect();

        let (column, order) = query.sort.unwrap_or((TaskColumn::Id, SortOrder::Ascending));
        rows.sort_by(|a, b| {
            let ordering = match column {
                TaskColumn::Id => a.id.cmp(&b.id),
                TaskColumn::ReferenceId => a.reference_id.cmp(&b.reference_id),
                TaskColumn::TaskGroup => a.task_group.cmp(&b.task_group),
                TaskColumn::TaskType => a.task_type.cmp(&b.task_type),
                TaskColumn::Status => a.status.cmp(&b.status),
            };
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });

        if let Some((start, end)) = query.range {
            rows = rows
                .into_iter()
                .skip(start as usize)
                .take((end - start) as usize)
                .collect();
        }

        Ok(rows)
    }

    async fn count(&self) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.len() as u64)
    }
}

fn matches_filters(task: &Task, query: &TaskQuery) -> bool {
    if let Some(ref group) = query.task_group {
        if task.task_group != *group {
            return false;
        }
    }
    if let Some(ref task_type) = query.task_type {
        if task.task_type != *task_type {
            return false;
        }
    }
    if let Some(ref status) = query.status {
        if task.status != *status {
            return false;
        }
    }
    if let Some(ref prefix) = query.reference_prefix {
        if !task.reference_id.starts_with(prefix.as_str()) {
            return false;
        }
    }
    true
}
