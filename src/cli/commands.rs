// ABOUTME: Command implementations for the taskmill CLI
// ABOUTME: Handles the create, start, notify, show, list, and delete commands

use anyhow::{bail, Result};
use tracing::info;

use crate::engine::TaskManager;
use crate::store::TaskQuery;
use crate::task::Task;

#[allow(clippy::too_many_arguments)]
pub async fn create_task(
    manager: &TaskManager,
    reference: Option<String>,
    group: String,
    task_type: String,
    recurring: bool,
    timeout: Option<i32>,
    properties: Option<String>,
) -> Result<()> {
    if !manager.valid_task_type(&task_type) {
        bail!("no workflow registered for task type '{}'", task_type);
    }

    let reference = reference.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut task = Task::new(&reference, &group, &task_type);
    task.recurring = recurring;
    if let Some(seconds) = timeout {
        task.timeout = seconds;
    }
    if let Some(payload) = properties {
        task.properties = payload.into_bytes();
    }

    let created = manager.create_task(task).await?;
    info!("created {}", created);
    println!("{}", created.id);
    Ok(())
}

pub async fn start_task(manager: &TaskManager, id: i64) -> Result<()> {
    manager.start_task(id).await?;

    let task = manager.find_task(id).await?;
    println!("task {} is now '{}'", task.id, task.status);
    Ok(())
}

pub async fn notify_task(
    manager: &TaskManager,
    id: i64,
    outcome: &str,
    message: Option<&str>,
) -> Result<()> {
    manager.notify_wait_result(id, outcome, message).await?;

    let task = manager.find_task(id).await?;
    println!("task {} is now '{}'", task.id, task.status);
    Ok(())
}

pub async fn show_task(manager: &TaskManager, id: i64) -> Result<()> {
    let task = manager.find_task(id).await?;
    println!("{}", serde_json::to_string_pretty(&task)?);
    Ok(())
}

pub async fn list_tasks(
    manager: &TaskManager,
    group: Option<String>,
    task_type: Option<String>,
    status: Option<String>,
    reference: Option<String>,
    limit: Option<u64>,
    offset: u64,
) -> Result<()> {
    let mut query = TaskQuery {
        task_group: group,
        task_type,
        status,
        reference_prefix: reference,
        ..TaskQuery::default()
    };
    if let Some(limit) = limit {
        query = query.range(offset, offset.saturating_add(limit));
    }

    let tasks = manager.find_all_tasks(query).await?;
    for task in &tasks {
        println!(
            "{:>6}  {:<10} {:<12} {:<12} {}",
            task.id, task.status, task.task_group, task.task_type, task.reference_id
        );
    }
    info!("{} task(s)", tasks.len());
    Ok(())
}

pub async fn delete_task(manager: &TaskManager, id: i64) -> Result<()> {
    manager.delete_task(id).await?;
    println!("task {} deleted", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTaskStore;
    use crate::workflow::{default_workflow, WorkflowRegistry};
    use std::sync::Arc;

    fn manager() -> TaskManager {
        let mut registry = WorkflowRegistry::new();
        registry.register("default", default_workflow);
        TaskManager::new(Arc::new(MemoryTaskStore::new()), registry)
    }

    #[tokio::test]
    async fn test_list_with_offset_near_max_does_not_overflow() {
        let manager = manager();
        manager
            .create_task(Task::new("ref-1", "reports", "default"))
            .await
            .unwrap();

        list_tasks(&manager, None, None, None, None, Some(10), u64::MAX)
            .await
            .unwrap();
    }
}
