// ABOUTME: Workflow definition data structures and handler classification
// ABOUTME: Models the status sequence, timeout table, and per-status handler lists

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::context::WorkflowContext;
use crate::task::NO_TIMEOUT;

/// An ordinary side-effecting handler. Failures are opaque to the engine and
/// route the task to `Error`.
pub type HandlerFn = Arc<dyn Fn(&mut WorkflowContext) -> anyhow::Result<()> + Send + Sync>;

/// One entry in a status's handler list.
///
/// A well-formed list holds zero or more `Run` entries followed by at most
/// one control marker. The marker tells the engine what to do once the
/// ordinary handlers for the status have run.
#[derive(Clone)]
pub enum Handler {
    /// Invoke a caller-supplied function against the execution context.
    Run(HandlerFn),

    /// Transition to the next status in sequence and keep processing.
    Advance,

    /// Stop processing; the task now waits for an external notification.
    Suspend,

    /// The workflow is finished; no further automatic action.
    Terminate,
}

impl Handler {
    pub fn run<F>(f: F) -> Self
    where
        F: Fn(&mut WorkflowContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Handler::Run(Arc::new(f))
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Run(_) => f.write_str("Run"),
            Handler::Advance => f.write_str("Advance"),
            Handler::Suspend => f.write_str("Suspend"),
            Handler::Terminate => f.write_str("Terminate"),
        }
    }
}

/// The ordered statuses, timeouts, and handlers governing one task type's
/// lifecycle.
///
/// A definition is built fresh by its factory for every engine invocation and
/// discarded when the invocation returns; it carries no identity beyond a
/// single execution.
#[derive(Debug, Default)]
pub struct WorkflowDefinition {
    sequence: Vec<String>,
    timeouts: HashMap<String, i32>,
    handlers: HashMap<String, Vec<Handler>>,
}

impl WorkflowDefinition {
    pub fn new(sequence: Vec<&str>) -> Self {
        Self {
            sequence: sequence.into_iter().map(String::from).collect(),
            timeouts: HashMap::new(),
            handlers: HashMap::new(),
        }
    }

    pub fn with_timeout(mut self, status: &str, seconds: i32) -> Self {
        self.timeouts.insert(status.to_string(), seconds);
        self
    }

    pub fn with_handlers(mut self, status: &str, handlers: Vec<Handler>) -> Self {
        self.handlers.insert(status.to_string(), handlers);
        self
    }

    pub fn sequence(&self) -> &[String] {
        &self.sequence
    }

    /// The status following `status` in sequence, or `None` when `status` is
    /// the last entry or not part of the sequence at all.
    pub fn next_status(&self, status: &str) -> Option<&str> {
        let index = self.sequence.iter().position(|s| s == status)?;
        self.sequence.get(index + 1).map(String::as_str)
    }

    pub fn is_last_status(&self, status: &str) -> bool {
        self.sequence.last().map(String::as_str) == Some(status)
    }

    /// Declared timeout for `status`; absent entries mean no timeout.
    pub fn timeout_for(&self, status: &str) -> i32 {
        self.timeouts.get(status).copied().unwrap_or(NO_TIMEOUT)
    }

    pub fn handlers_for(&self, status: &str) -> &[Handler] {
        self.handlers.get(status).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether entering `status` leaves the task waiting on an external
    /// notification.
    pub fn suspends_at(&self, status: &str) -> bool {
        self.handlers_for(status)
            .iter()
            .any(|h| matches!(h, Handler::Suspend))
    }
}
