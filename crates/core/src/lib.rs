//! idlesync - Core Logic
//!
//! Main-thread task scheduling for plugins whose host only allows API
//! calls from its main thread.
//!
//! # Re-exports
//!
//! This crate re-exports the SDK and host crates for convenience:
//! - [`sdk`] - Host C types and error codes
//! - [`host`] - Host entry points and main thread identity

use tracing::info;

pub use idlesync_host as host;
pub use idlesync_sdk as sdk;

pub mod config;
pub mod hooks;
pub mod tasks;

// Re-export commonly used items
pub use config::{ConfigError, ConfigResult, CoreConfig, PluginConfig};
pub use hooks::{idle_count, last_drain_time_ns, on_idle, IdleReport};
pub use tasks::{
    schedule_or_execute, schedule_task, schedule_task_with_result, ExecutionMode, Handle,
    HostIdleTrigger, IdleTrigger, Scheduler, SchedulerError, ShutdownPolicy, TaskError,
    TaskResult,
};

/// Shutdown the plugin
///
/// Called from the FFI layer when the host unloads the plugin. Pending
/// tasks are dropped without running; the host API may already be torn
/// down at this point.
pub fn shutdown() {
    info!("idlesync shutting down...");

    if let Some(scheduler) = tasks::try_scheduler() {
        let dropped = scheduler.shutdown(ShutdownPolicy::Discard);
        if dropped > 0 {
            info!("Discarded {} pending tasks", dropped);
        }
    }
}
