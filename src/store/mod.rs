// ABOUTME: Task storage trait and query types
// ABOUTME: Relational CRUD surface consumed by the workflow engine

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::MemoryTaskStore;
pub use postgres::PgTaskStore;

use async_trait::async_trait;

use crate::task::Task;

/// Columns tasks can be filtered or sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskColumn {
    Id,
    ReferenceId,
    TaskGroup,
    TaskType,
    Status,
}

impl TaskColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            TaskColumn::Id => "id",
            TaskColumn::ReferenceId => "reference_id",
            TaskColumn::TaskGroup => "task_group",
            TaskColumn::TaskType => "task_type",
            TaskColumn::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Filter, sort, and pagination options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub task_group: Option<String>,
    pub task_type: Option<String>,
    pub status: Option<String>,

    /// Prefix match against the reference id.
    pub reference_prefix: Option<String>,

    pub sort: Option<(TaskColumn, SortOrder)>,

    /// Half-open row range `[start, end)` mapped to limit/offset.
    pub range: Option<(u64, u64)>,
}

impl TaskQuery {
    pub fn by_group_and_status(task_group: &str, status: &str) -> Self {
        Self {
            task_group: Some(task_group.to_string()),
            status: Some(status.to_string()),
            ..Self::default()
        }
    }

    pub fn by_type_and_status(task_type: &str, status: &str) -> Self {
        Self {
            task_type: Some(task_type.to_string()),
            status: Some(status.to_string()),
            ..Self::default()
        }
    }

    pub fn sorted(mut self, column: TaskColumn, order: SortOrder) -> Self {
        self.sort = Some((column, order));
        self
    }

    pub fn range(mut self, start: u64, end: u64) -> Self {
        self.range = Some((start, end));
        self
    }
}

/// Storage collaborator for task records.
///
/// Implementations own identity assignment and the two normalization rules:
/// `create` forces status to `Created`, and both `create` and `update` clamp
/// timeouts below one second to -1.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task, assigning its id and resetting its status.
    async fn create(&self, task: Task) -> Result<Task>;

    async fn find(&self, id: i64) -> Result<Task>;

    /// Full-row replace keyed by id.
    async fn update(&self, task: &Task) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn find_all(&self, query: TaskQuery) -> Result<Vec<Task>>;

    async fn count(&self) -> Result<u64>;
}
