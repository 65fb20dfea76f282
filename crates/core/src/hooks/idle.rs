//! Idle hook handler
//!
//! Called on the host main thread every idle cycle via the FFI layer.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::tasks::{self, Scheduler};

/// Idle call counter (increments every idle hook call)
static IDLE_COUNT: AtomicU64 = AtomicU64::new(0);

/// Processing time of the last task drained from the idle hook (nanoseconds)
static LAST_DRAIN_TIME_NS: AtomicU64 = AtomicU64::new(0);

/// Result of one idle cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleReport {
    /// Whether a queued task was run
    pub ran_task: bool,
    /// Tasks still waiting afterwards
    pub pending: usize,
}

impl IdleReport {
    /// Whether the host should come back without sleeping
    pub fn wants_more(&self) -> bool {
        self.pending > 0
    }
}

/// Get the number of idle cycles seen so far
pub fn idle_count() -> u64 {
    IDLE_COUNT.load(Ordering::Relaxed)
}

/// Get the processing time of the last drained task in nanoseconds
pub fn last_drain_time_ns() -> u64 {
    LAST_DRAIN_TIME_NS.load(Ordering::Relaxed)
}

/// Called from the host idle hook on the main thread
///
/// Drains at most one task from the installed scheduler. Does nothing
/// before a scheduler is installed.
pub fn on_idle() -> IdleReport {
    IDLE_COUNT.fetch_add(1, Ordering::Relaxed);

    match tasks::try_scheduler() {
        Some(scheduler) => run_idle(scheduler),
        None => IdleReport {
            ran_task: false,
            pending: 0,
        },
    }
}

/// Drain one task from `scheduler` and record timing
pub fn run_idle(scheduler: &Scheduler) -> IdleReport {
    let start = std::time::Instant::now();
    let ran_task = scheduler.drain();

    if ran_task {
        let elapsed = start.elapsed().as_nanos() as u64;
        LAST_DRAIN_TIME_NS.store(elapsed, Ordering::Relaxed);
    }

    IdleReport {
        ran_task,
        pending: scheduler.pending(),
    }
}
