//! Execution strategy for `schedule_or_execute`
//!
//! Code that runs both inside the host and standalone (tools, tests, batch
//! runners) uses [`Scheduler::schedule_or_execute`](super::Scheduler::schedule_or_execute).
//! Inside the host the work has to wait for the main thread. Standalone
//! there is no idle loop, so the work runs in place.
//!
//! The mode is picked once when the scheduler is built and never changes.
//! Its default comes from the `immediate` cargo feature.

use serde::{Deserialize, Serialize};

use super::cell::{result_cell, Handle};
use super::error::{capture, TaskError};

/// How `schedule_or_execute` runs its work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Queue the work for the host main thread
    Queued,
    /// Run the work on the calling thread before returning
    Immediate,
}

impl ExecutionMode {
    /// Mode selected by the build configuration
    pub const fn build_default() -> Self {
        if cfg!(feature = "immediate") {
            Self::Immediate
        } else {
            Self::Queued
        }
    }
}

impl Default for ExecutionMode {
    fn default() -> Self {
        Self::build_default()
    }
}

/// Run `task` now and return an already completed handle
///
/// A panic is caught and discarded: the handle resolves to
/// [`TaskError::Discarded`] without the panic message. This differs from
/// the queued path, which hands the failure to the reader.
pub(crate) fn execute_now<T, F>(task: F, report_failures: bool) -> Handle<T>
where
    F: FnOnce() -> T,
{
    let (writer, handle) = result_cell();

    match capture(task) {
        Ok(value) => writer.set(Ok(value)),
        Err(e) => {
            if report_failures {
                tracing::warn!("Discarded failure from immediate task: {}", e);
            }
            writer.set(Err(TaskError::Discarded));
        }
    }

    handle
}
