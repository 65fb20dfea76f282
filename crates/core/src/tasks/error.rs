//! Task and scheduler error types

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Failure outcome of a value-producing task
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The task body panicked; holds the panic message
    #[error("Task panicked: {0}")]
    Panicked(String),

    /// The task was dropped without running (discarded at shutdown)
    #[error("Task was dropped before it ran")]
    Abandoned,

    /// The task failed under immediate execution and its failure was discarded
    #[error("Task failed during immediate execution")]
    Discarded,
}

/// Outcome stored in a result cell
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors from the process-wide scheduler slot
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// No scheduler has been installed yet
    #[error("Scheduler not installed")]
    NotInstalled,

    /// A scheduler is already installed for this process
    #[error("Scheduler already installed")]
    AlreadyInstalled,
}

/// Run `f`, turning a panic into [`TaskError::Panicked`]
pub(crate) fn capture<T, F>(f: F) -> TaskResult<T>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| TaskError::Panicked(panic_message(&*payload)))
}

/// Extract a readable message from a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
