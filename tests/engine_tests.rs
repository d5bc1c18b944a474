// ABOUTME: Integration tests for the workflow execution engine
// ABOUTME: Exercises starting, suspending, resuming, failing, and recurring tasks

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use taskmill::{EngineError, Handler, Task, TaskStore, WorkflowDefinition, NO_TIMEOUT};

mod common;
use common::{counting_workflow, default_task, manager_over, TestManagerBuilder, UpdateQuotaStore};

#[tokio::test]
async fn test_default_workflow_runs_to_waiting() {
    let builder = TestManagerBuilder::new().with_default_workflow();
    let store = builder.store();
    let manager = builder.build();

    let task = manager.create_task(default_task()).await.unwrap();
    manager.start_task(task.id).await.unwrap();

    // Created -> advance -> Active -> advance -> Waiting -> suspend
    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Waiting");
    assert_eq!(stored.timeout, NO_TIMEOUT);
}

#[tokio::test]
async fn test_default_workflow_completes_after_notification() {
    let builder = TestManagerBuilder::new().with_default_workflow();
    let store = builder.store();
    let manager = builder.build();

    let task = manager.create_task(default_task()).await.unwrap();
    manager.start_task(task.id).await.unwrap();
    manager
        .notify_wait_result(task.id, "success", None)
        .await
        .unwrap();

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Complete");
    assert_eq!(stored.timeout, NO_TIMEOUT);
}

#[tokio::test]
async fn test_advance_only_assigns_sequence_statuses() {
    let counter = Arc::new(AtomicUsize::new(0));
    let workflow_counter = Arc::clone(&counter);

    let builder = TestManagerBuilder::new()
        .with_workflow("counting", move || {
            counting_workflow(Arc::clone(&workflow_counter))
        });
    let store = builder.store();
    let manager = builder.build();

    let task = manager
        .create_task(Task::new("ref-1", "reports", "counting"))
        .await
        .unwrap();
    manager.start_task(task.id).await.unwrap();

    // Every status handler ran exactly once, in one externally-visible call.
    assert_eq!(counter.load(Ordering::SeqCst), 4);

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Complete");
}

#[tokio::test]
async fn test_intermediate_timeout_is_persisted() {
    let builder = TestManagerBuilder::new().with_workflow("paused", || {
        WorkflowDefinition::new(vec!["Created", "Staged", "Complete"])
            .with_timeout("Staged", 120)
            .with_handlers("Created", vec![Handler::Advance])
            .with_handlers("Staged", vec![Handler::Suspend])
            .with_handlers("Complete", vec![Handler::Terminate])
    });
    let store = builder.store();
    let manager = builder.build();

    let task = manager
        .create_task(Task::new("ref-1", "reports", "paused"))
        .await
        .unwrap();
    manager.start_task(task.id).await.unwrap();

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Staged");
    assert_eq!(stored.timeout, 120);
}

#[tokio::test]
async fn test_start_requires_created_status() {
    let builder = TestManagerBuilder::new().with_default_workflow();
    let store = builder.store();
    let manager = builder.build();

    let task = manager.create_task(default_task()).await.unwrap();
    manager.start_task(task.id).await.unwrap();

    let err = manager.start_task(task.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotStartable { .. }));

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Error");
}

#[tokio::test]
async fn test_notify_error_records_supplied_message() {
    let builder = TestManagerBuilder::new().with_default_workflow();
    let store = builder.store();
    let manager = builder.build();

    let task = manager.create_task(default_task()).await.unwrap();
    manager.start_task(task.id).await.unwrap();
    manager
        .notify_wait_result(task.id, "error", Some("remote job failed"))
        .await
        .unwrap();

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Error");
    assert_eq!(stored.message, "remote job failed");
}

#[tokio::test]
async fn test_notify_rejects_unknown_outcome_without_mutation() {
    let builder = TestManagerBuilder::new().with_default_workflow();
    let store = builder.store();
    let manager = builder.build();

    let task = manager.create_task(default_task()).await.unwrap();
    manager.start_task(task.id).await.unwrap();
    let before = store.find(task.id).await.unwrap();

    let err = manager
        .notify_wait_result(task.id, "retry", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOutcome { .. }));

    let after = store.find(task.id).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_strict_resume_leaves_non_suspended_task_alone() {
    let builder = TestManagerBuilder::new()
        .with_default_workflow()
        .with_strict_resume();
    let store = builder.store();
    let manager = builder.build();

    let task = manager.create_task(default_task()).await.unwrap();

    let err = manager
        .notify_wait_result(task.id, "success", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotSuspended { .. }));

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Created");
}

#[tokio::test]
async fn test_strict_resume_still_accepts_suspended_task() {
    let builder = TestManagerBuilder::new()
        .with_default_workflow()
        .with_strict_resume();
    let store = builder.store();
    let manager = builder.build();

    let task = manager.create_task(default_task()).await.unwrap();
    manager.start_task(task.id).await.unwrap();
    manager
        .notify_wait_result(task.id, "success", None)
        .await
        .unwrap();

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Complete");
}

#[tokio::test]
async fn test_handler_failure_moves_task_to_error() {
    let builder = TestManagerBuilder::new().with_workflow("failing", || {
        WorkflowDefinition::new(vec!["Created", "Active", "Complete"])
            .with_handlers("Created", vec![Handler::Advance])
            .with_handlers(
                "Active",
                vec![
                    Handler::run(|_| anyhow::bail!("credentials expired")),
                    Handler::Advance,
                ],
            )
            .with_handlers("Complete", vec![Handler::Terminate])
    });
    let store = builder.store();
    let manager = builder.build();

    let task = manager
        .create_task(Task::new("ref-1", "reports", "failing"))
        .await
        .unwrap();

    let err = manager.start_task(task.id).await.unwrap_err();
    assert!(matches!(err, EngineError::HandlerFailed { .. }));

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Error");
    assert!(stored.message.contains("credentials expired"));
}

#[tokio::test]
async fn test_error_handlers_observe_failure() {
    let seen = Arc::new(AtomicUsize::new(0));
    let handler_seen = Arc::clone(&seen);

    let builder = TestManagerBuilder::new().with_workflow("observed", move || {
        let seen = Arc::clone(&handler_seen);
        WorkflowDefinition::new(vec!["Created", "Complete"])
            .with_handlers(
                "Created",
                vec![
                    Handler::run(|_| anyhow::bail!("nope")),
                    Handler::Advance,
                ],
            )
            .with_handlers("Complete", vec![Handler::Terminate])
            .with_handlers(
                "Error",
                vec![Handler::run(move |ctx| {
                    assert_eq!(ctx.task.status, "Error");
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })],
            )
    });
    let manager = builder.build();

    let task = manager
        .create_task(Task::new("ref-1", "reports", "observed"))
        .await
        .unwrap();
    manager.start_task(task.id).await.unwrap_err();

    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recurring_task_spawns_exactly_one_successor() {
    let builder = TestManagerBuilder::new().with_default_workflow();
    let store = builder.store();
    let manager = builder.build();

    let task = manager
        .create_task(
            Task::new("ref-recurring", "reports", "default")
                .recurring()
                .with_properties(b"{\"report\":\"weekly\"}".to_vec()),
        )
        .await
        .unwrap();

    manager.start_task(task.id).await.unwrap();
    manager
        .notify_wait_result(task.id, "success", None)
        .await
        .unwrap();

    assert_eq!(store.count().await.unwrap(), 2);

    let successor = store.find(task.id + 1).await.unwrap();
    assert_eq!(successor.status, "Created");
    assert_eq!(successor.task_type, "default");
    assert_eq!(successor.task_group, "reports");
    assert_eq!(successor.reference_id, "ref-recurring");
    assert_eq!(successor.properties, b"{\"report\":\"weekly\"}");
    assert_ne!(successor.id, task.id);
}

#[tokio::test]
async fn test_recurring_task_respawns_from_error_path() {
    let builder = TestManagerBuilder::new().with_default_workflow();
    let store = builder.store();
    let manager = builder.build();

    let task = manager
        .create_task(Task::new("ref-1", "reports", "default").recurring())
        .await
        .unwrap();

    manager.start_task(task.id).await.unwrap();
    manager
        .notify_wait_result(task.id, "error", Some("gave up"))
        .await
        .unwrap();

    assert_eq!(store.count().await.unwrap(), 2);

    let failed = store.find(task.id).await.unwrap();
    assert_eq!(failed.status, "Error");

    let successor = store.find(task.id + 1).await.unwrap();
    assert_eq!(successor.status, "Created");
    assert!(successor.message.is_empty());
}

#[tokio::test]
async fn test_update_failure_during_advance_routes_to_error_path() {
    let store = Arc::new(UpdateQuotaStore::new(1));
    let manager = manager_over(store.clone());

    let task = manager.create_task(default_task()).await.unwrap();

    // The first transition persists; the second fails, and the error path's
    // own update failure is swallowed so the call still completes.
    let err = manager.start_task(task.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Active");
    assert!(stored.message.is_empty());
}

#[tokio::test]
async fn test_notify_error_succeeds_even_when_error_state_cannot_persist() {
    let store = Arc::new(UpdateQuotaStore::new(2));
    let manager = manager_over(store.clone());

    let task = manager.create_task(default_task()).await.unwrap();
    manager.start_task(task.id).await.unwrap();

    // Both transitions used up the quota; persisting the Error status now
    // fails, but the error path must still complete and answer the caller.
    manager
        .notify_wait_result(task.id, "error", Some("remote gave up"))
        .await
        .unwrap();

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Waiting");
}

#[tokio::test]
async fn test_resuming_an_errored_task_fails_cleanly() {
    let builder = TestManagerBuilder::new().with_default_workflow();
    let store = builder.store();
    let manager = builder.build();

    let task = manager.create_task(default_task()).await.unwrap();
    manager.start_task(task.id).await.unwrap();
    manager
        .notify_wait_result(task.id, "error", Some("boom"))
        .await
        .unwrap();

    // Error is not part of the sequence, so a lenient resume cannot advance.
    let err = manager
        .notify_wait_result(task.id, "success", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SequenceEnd { .. }));

    let stored = store.find(task.id).await.unwrap();
    assert_eq!(stored.status, "Error");
}

#[tokio::test]
async fn test_non_recurring_task_spawns_nothing() {
    let builder = TestManagerBuilder::new().with_default_workflow();
    let store = builder.store();
    let manager = builder.build();

    let task = manager.create_task(default_task()).await.unwrap();
    manager.start_task(task.id).await.unwrap();
    manager
        .notify_wait_result(task.id, "success", None)
        .await
        .unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
}
