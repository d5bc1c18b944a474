// ABOUTME: Reference workflow definition shipped with the engine
// ABOUTME: Created -> Active -> Waiting -> Complete with logging at each status

use tracing::info;

use super::definition::{Handler, WorkflowDefinition};
use crate::task::{NO_TIMEOUT, STATUS_ERROR};

/// Build the stock four-status workflow.
///
/// A task started under this workflow advances straight through `Created`
/// and `Active`, suspends at `Waiting` until an external notification
/// arrives, then terminates at `Complete`.
pub fn default_workflow() -> WorkflowDefinition {
    WorkflowDefinition::new(vec!["Created", "Active", "Waiting", "Complete"])
        .with_timeout("Created", NO_TIMEOUT)
        .with_timeout("Active", 300)
        .with_timeout("Waiting", NO_TIMEOUT)
        .with_timeout("Complete", NO_TIMEOUT)
        .with_timeout(STATUS_ERROR, NO_TIMEOUT)
        .with_handlers(
            "Created",
            vec![
                Handler::run(|ctx| {
                    info!("task {} has been created", ctx.task.id);
                    Ok(())
                }),
                Handler::Advance,
            ],
        )
        .with_handlers(
            "Active",
            vec![
                Handler::run(|ctx| {
                    info!("task {} is active", ctx.task.id);
                    Ok(())
                }),
                Handler::Advance,
            ],
        )
        .with_handlers(
            "Waiting",
            vec![
                Handler::run(|ctx| {
                    info!("task {} is waiting", ctx.task.id);
                    Ok(())
                }),
                Handler::Suspend,
            ],
        )
        .with_handlers(
            "Complete",
            vec![
                Handler::run(|ctx| {
                    info!("task {} is complete", ctx.task.id);
                    Ok(())
                }),
                Handler::Terminate,
            ],
        )
        .with_handlers(
            STATUS_ERROR,
            vec![Handler::run(|ctx| {
                info!("task {} has an error: {}", ctx.task.id, ctx.task.message);
                Ok(())
            })],
        )
}
