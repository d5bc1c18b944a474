// ABOUTME: Task manager facade and the status advancement algorithm
// ABOUTME: Starts tasks, resumes suspended ones, and routes failures to Error

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::context::WorkflowContext;
use super::error::{EngineError, Result};
use crate::store::{self, TaskQuery, TaskStore};
use crate::task::{Task, STATUS_CREATED, STATUS_ERROR};
use crate::workflow::{Handler, WorkflowDefinition, WorkflowRegistry};

/// What a status's handler list told the engine to do next.
enum Flow {
    /// An advance marker was reached; move to the next status.
    Advance,
    /// A suspend marker was reached; return control to the caller.
    Suspend,
    /// A terminate marker was reached; the workflow is finished.
    Terminate,
    /// The list ran out without a control marker; stop processing.
    Stop,
}

/// Facade over the workflow registry and task storage.
///
/// All status mutations go through this type. There is no locking or
/// compare-and-swap around the read-modify-write of a task row: two
/// concurrent calls against the same id can race and the last update wins.
pub struct TaskManager {
    store: Arc<dyn TaskStore>,
    registry: WorkflowRegistry,
    strict_resume: bool,
}

impl TaskManager {
    pub fn new(store: Arc<dyn TaskStore>, registry: WorkflowRegistry) -> Self {
        Self {
            store,
            registry,
            strict_resume: false,
        }
    }

    /// When enabled, a success notification for a task whose current status
    /// has no suspend marker is rejected without mutating the task. The
    /// default is lenient: the task is advanced from wherever it is.
    pub fn with_strict_resume(mut self, strict: bool) -> Self {
        self.strict_resume = strict;
        self
    }

    /// Whether a workflow is registered for `task_type`.
    pub fn valid_task_type(&self, task_type: &str) -> bool {
        self.registry.contains(task_type)
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    pub async fn create_task(&self, task: Task) -> store::Result<Task> {
        self.store.create(task).await
    }

    pub async fn find_task(&self, id: i64) -> store::Result<Task> {
        self.store.find(id).await
    }

    pub async fn find_all_tasks(&self, query: TaskQuery) -> store::Result<Vec<Task>> {
        self.store.find_all(query).await
    }

    pub async fn delete_task(&self, id: i64) -> store::Result<()> {
        self.store.delete(id).await
    }

    pub async fn count_tasks(&self) -> store::Result<u64> {
        self.store.count().await
    }

    /// Begin executing a task's workflow from its `Created` status.
    ///
    /// The call runs the `Created` handler list and, via advance markers,
    /// keeps transitioning forward until a suspend or terminate marker is
    /// reached or a handler fails.
    pub async fn start_task(&self, id: i64) -> Result<()> {
        let (task, workflow) = self.load(id).await?;
        let mut ctx = WorkflowContext::new(task);

        if ctx.task.status != STATUS_CREATED {
            let err = EngineError::NotStartable {
                id,
                status: ctx.task.status.clone(),
            };
            self.fail_task(&mut ctx, &workflow, &err.to_string()).await;
            return Err(err);
        }

        info!("starting task {}", id);
        match self.run_status(&mut ctx, &workflow, STATUS_CREATED) {
            Ok(Flow::Advance) => self.advance(&mut ctx, &workflow).await,
            Ok(Flow::Suspend) | Ok(Flow::Stop) => Ok(()),
            Ok(Flow::Terminate) => {
                self.finish(&ctx).await;
                Ok(())
            }
            Err(err) => {
                self.fail_task(&mut ctx, &workflow, &err.to_string()).await;
                Err(err)
            }
        }
    }

    /// Resume a suspended task with the outcome of whatever it was waiting
    /// on. `outcome` must be `"success"` or `"error"`; anything else is
    /// rejected without touching the task.
    pub async fn notify_wait_result(
        &self,
        id: i64,
        outcome: &str,
        message: Option<&str>,
    ) -> Result<()> {
        if outcome != "success" && outcome != "error" {
            warn!("rejecting wait notification for task {id}: invalid outcome '{outcome}'");
            return Err(EngineError::InvalidOutcome {
                outcome: outcome.to_string(),
            });
        }

        let (task, workflow) = self.load(id).await?;
        let mut ctx = WorkflowContext::new(task);

        if outcome == "error" {
            self.fail_task(&mut ctx, &workflow, message.unwrap_or_default())
                .await;
            return Ok(());
        }

        if self.strict_resume && !workflow.suspends_at(&ctx.task.status) {
            return Err(EngineError::NotSuspended {
                id,
                status: ctx.task.status.clone(),
            });
        }

        info!("resuming task {} from status '{}'", id, ctx.task.status);
        self.advance(&mut ctx, &workflow).await
    }

    async fn load(&self, id: i64) -> Result<(Task, WorkflowDefinition)> {
        let task = self
            .store
            .find(id)
            .await
            .map_err(|source| EngineError::TaskNotFound { id, source })?;

        let workflow =
            self.registry
                .build(&task.task_type)
                .ok_or_else(|| EngineError::UnknownTaskType {
                    task_type: task.task_type.clone(),
                })?;

        Ok((task, workflow))
    }

    /// Transition to the next status in sequence, persist, and keep going
    /// until a handler list suspends, terminates, or fails.
    ///
    /// A chain of statuses whose lists end in advance markers collapses into
    /// this single loop.
    async fn advance(&self, ctx: &mut WorkflowContext, workflow: &WorkflowDefinition) -> Result<()> {
        loop {
            let current = ctx.task.status.clone();

            // Reaching the last status here means the author forgot a
            // terminate marker on it.
            if workflow.is_last_status(&current) {
                let err = EngineError::SequenceEnd { status: current };
                self.fail_task(ctx, workflow, &err.to_string()).await;
                return Err(err);
            }

            let next = match workflow.next_status(&current) {
                Some(next) => next.to_string(),
                None => {
                    // The task sits on a status the sequence does not know,
                    // such as the absorbing Error status.
                    let err = EngineError::SequenceEnd { status: current };
                    self.fail_task(ctx, workflow, &err.to_string()).await;
                    return Err(err);
                }
            };

            debug!(
                "advancing task {} from '{}' to '{}'",
                ctx.task.id, current, next
            );
            ctx.task.status = next.clone();
            ctx.task.timeout = workflow.timeout_for(&next);

            if let Err(store_err) = self.store.update(&ctx.task).await {
                let err = EngineError::Store(store_err);
                self.fail_task(ctx, workflow, &err.to_string()).await;
                return Err(err);
            }

            match self.run_status(ctx, workflow, &next) {
                Ok(Flow::Advance) => continue,
                Ok(Flow::Suspend) | Ok(Flow::Stop) => return Ok(()),
                Ok(Flow::Terminate) => {
                    self.finish(ctx).await;
                    return Ok(());
                }
                Err(err) => {
                    self.fail_task(ctx, workflow, &err.to_string()).await;
                    return Err(err);
                }
            }
        }
    }

    /// Run one status's handler list in order until a control marker or a
    /// failure. An exhausted list without a marker simply stops processing.
    fn run_status(
        &self,
        ctx: &mut WorkflowContext,
        workflow: &WorkflowDefinition,
        status: &str,
    ) -> Result<Flow> {
        for handler in workflow.handlers_for(status) {
            match handler {
                Handler::Run(f) => f(ctx).map_err(|e| EngineError::HandlerFailed {
                    status: status.to_string(),
                    message: e.to_string(),
                })?,
                Handler::Advance => return Ok(Flow::Advance),
                Handler::Suspend => return Ok(Flow::Suspend),
                Handler::Terminate => return Ok(Flow::Terminate),
            }
        }
        Ok(Flow::Stop)
    }

    /// Route a failure into the absorbing `Error` status.
    ///
    /// This path must always complete: a persistence failure here is logged
    /// and swallowed, and `Error` handlers run for diagnostics only with
    /// their results ignored.
    async fn fail_task(
        &self,
        ctx: &mut WorkflowContext,
        workflow: &WorkflowDefinition,
        message: &str,
    ) {
        warn!("task {} failed: {}", ctx.task.id, message);
        ctx.task.status = STATUS_ERROR.to_string();
        ctx.task.message = message.to_string();

        if let Err(err) = self.store.update(&ctx.task).await {
            warn!(
                "could not persist error state for task {}: {}",
                ctx.task.id, err
            );
        }

        for handler in workflow.handlers_for(STATUS_ERROR) {
            if let Handler::Run(f) = handler {
                if let Err(err) = f(ctx) {
                    debug!("error handler for task {} failed: {}", ctx.task.id, err);
                }
            }
        }

        self.finish(ctx).await;
    }

    /// Terminal bookkeeping: when the finished task is recurring, re-submit
    /// its original definition so a fresh instance starts over at `Created`.
    /// Best effort only; a creation failure is a warning, never an error.
    async fn finish(&self, ctx: &WorkflowContext) {
        let Some(definition) = ctx.recurring_definition() else {
            return;
        };

        let mut fresh = definition.clone();
        fresh.id = 0;
        fresh.message.clear();

        match self.store.create(fresh).await {
            Ok(created) => info!(
                "recurring task {} respawned as task {}",
                ctx.task.id, created.id
            ),
            Err(err) => warn!("could not respawn recurring task {}: {}", ctx.task.id, err),
        }
    }
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("registry", &self.registry)
            .field("strict_resume", &self.strict_resume)
            .finish()
    }
}
