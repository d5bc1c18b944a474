// ABOUTME: PostgreSQL-backed task store implementation using sqlx
// ABOUTME: Full-row CRUD plus the filtered, sorted, paginated listing query

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use super::error::{Result, StoreError};
use super::{TaskQuery, TaskStore};
use crate::task::{Task, STATUS_CREATED};

const TASK_COLUMNS: &str = "reference_id, task_group, task_type, recurring, \
                            status, timeout, message, properties";

const CREATE_TASK_SQL: &str = "INSERT INTO tasks \
    (reference_id, task_group, task_type, recurring, status, timeout, message, properties) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
    RETURNING id";

const UPDATE_TASK_SQL: &str = "UPDATE tasks \
    SET (reference_id, task_group, task_type, recurring, status, timeout, message, properties) = \
    ($2, $3, $4, $5, $6, $7, $8, $9) \
    WHERE id = $1";

const DELETE_TASK_SQL: &str = "DELETE FROM tasks WHERE id = $1";

const COUNT_TASKS_SQL: &str = "SELECT count(id) FROM tasks";

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS tasks (\
    id BIGSERIAL PRIMARY KEY, \
    reference_id TEXT NOT NULL DEFAULT '', \
    task_group TEXT NOT NULL DEFAULT '', \
    task_type TEXT NOT NULL DEFAULT '', \
    recurring BOOLEAN NOT NULL DEFAULT FALSE, \
    status TEXT NOT NULL DEFAULT 'Created', \
    timeout INTEGER NOT NULL DEFAULT -1, \
    message TEXT NOT NULL DEFAULT '', \
    properties BYTEA NOT NULL DEFAULT ''\
)";

/// A [`TaskStore`] backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Create the tasks table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

fn task_from_row(row: &sqlx::postgres::PgRow) -> std::result::Result<Task, sqlx::Error> {
    Ok(Task {
        id: row.try_get("id")?,
        reference_id: row.try_get("reference_id")?,
        task_group: row.try_get("task_group")?,
        task_type: row.try_get("task_type")?,
        recurring: row.try_get("recurring")?,
        status: row.try_get("status")?,
        timeout: row.try_get("timeout")?,
        message: row.try_get("message")?,
        properties: row.try_get("properties")?,
    })
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, mut task: Task) -> Result<Task> {
        task.normalize_timeout();
        task.status = STATUS_CREATED.to_string();

        let row = sqlx::query(CREATE_TASK_SQL)
            .bind(&task.reference_id)
            .bind(&task.task_group)
            .bind(&task.task_type)
            .bind(task.recurring)
            .bind(&task.status)
            .bind(task.timeout)
            .bind(&task.message)
            .bind(&task.properties)
            .fetch_one(&self.pool)
            .await?;

        task.id = row.try_get("id").map_err(StoreError::Database)?;
        Ok(task)
    }

    async fn find(&self, id: i64) -> Result<Task> {
        let sql = format!("SELECT id, {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { id })?;

        task_from_row(&row).map_err(StoreError::Database)
    }

    async fn update(&self, task: &Task) -> Result<()> {
        let mut row = task.clone();
        row.normalize_timeout();

        let result = sqlx::query(UPDATE_TASK_SQL)
            .bind(row.id)
            .bind(&row.reference_id)
            .bind(&row.task_group)
            .bind(&row.task_type)
            .bind(row.recurring)
            .bind(&row.status)
            .bind(row.timeout)
            .bind(&row.message)
            .bind(&row.properties)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id: row.id });
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query(DELETE_TASK_SQL)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }

    async fn find_all(&self, query: TaskQuery) -> Result<Vec<Task>> {
        if let Some((start, end)) = query.range {
            if start > end {
                return Err(StoreError::InvalidRange { start, end });
            }
        }

        let mut sql = format!("SELECT id, {TASK_COLUMNS} FROM tasks");
        let mut clauses = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(ref group) = query.task_group {
            binds.push(group.clone());
            clauses.push(format!("task_group = ${}", binds.len()));
        }
        if let Some(ref task_type) = query.task_type {
            binds.push(task_type.clone());
            clauses.push(format!("task_type = ${}", binds.len()));
        }
        if let Some(ref status) = query.status {
            binds.push(status.clone());
            clauses.push(format!("status = ${}", binds.len()));
        }
        if let Some(ref prefix) = query.reference_prefix {
            binds.push(format!("{prefix}%"));
            clauses.push(format!("reference_id LIKE ${}", binds.len()));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        // Sort columns come from an enum, never from caller strings.
        if let Some((column, order)) = query.sort {
            sql.push_str(&format!(" ORDER BY {} {}", column.as_sql(), order.as_sql()));
        } else {
            sql.push_str(" ORDER BY id ASC");
        }

        if let Some((start, end)) = query.range {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", end - start, start));
        }

        let mut statement = sqlx::query(&sql);
        for bind in &binds {
            statement = statement.bind(bind);
        }

        let rows = statement.fetch_all(&self.pool).await?;
        let mut tasks = Vec::with_capacity(rows.len());
        for row in &rows {
            tasks.push(task_from_row(row).map_err(StoreError::Database)?);
        }
        Ok(tasks)
    }

    async fn count(&self) -> Result<u64> {
        let row = sqlx::query(COUNT_TASKS_SQL).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0).map_err(StoreError::Database)?;
        Ok(count as u64)
    }
}
