//! Process-wide scheduler
//!
//! The FFI layer builds one [`Scheduler`] at plugin load and installs it
//! here so code without a scheduler reference can still submit work. All
//! producers and the host idle hook then share the same queue.

use std::sync::OnceLock;

use super::cell::Handle;
use super::error::SchedulerError;
use super::scheduler::Scheduler;

static SCHEDULER: OnceLock<Scheduler> = OnceLock::new();

/// Install the process-wide scheduler
///
/// Can only succeed once per process.
pub fn install(scheduler: Scheduler) -> Result<&'static Scheduler, SchedulerError> {
    let mode = scheduler.mode();
    SCHEDULER
        .set(scheduler)
        .map_err(|_| SchedulerError::AlreadyInstalled)?;
    tracing::debug!("Scheduler installed ({:?})", mode);
    self::scheduler()
}

/// Get the installed scheduler
pub fn scheduler() -> Result<&'static Scheduler, SchedulerError> {
    SCHEDULER.get().ok_or(SchedulerError::NotInstalled)
}

/// Get the installed scheduler, if any
pub fn try_scheduler() -> Option<&'static Scheduler> {
    SCHEDULER.get()
}

/// Queue a task on the installed scheduler
///
/// See [`Scheduler::submit`].
#[tracing::instrument(skip(task))]
pub fn schedule_task<F>(task: F, notify_host: bool) -> Result<(), SchedulerError>
where
    F: FnOnce() + Send + 'static,
{
    scheduler()?.submit(task, notify_host);
    Ok(())
}

/// Queue a value-producing task on the installed scheduler
///
/// See [`Scheduler::submit_with_result`].
#[tracing::instrument(skip(task))]
pub fn schedule_task_with_result<T, F>(
    task: F,
    notify_host: bool,
) -> Result<Handle<T>, SchedulerError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    Ok(scheduler()?.submit_with_result(task, notify_host))
}

/// Queue or run a task on the installed scheduler
///
/// See [`Scheduler::schedule_or_execute`].
#[tracing::instrument(skip(task))]
pub fn schedule_or_execute<T, F>(task: F) -> Result<Handle<T>, SchedulerError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    Ok(scheduler()?.schedule_or_execute(task))
}
