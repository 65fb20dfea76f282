//! Task scheduling for main thread execution
//!
//! Most host API calls are only valid on the host's main thread, but plugin
//! work often starts elsewhere: timers, listener threads, handlers for
//! external commands. This module moves that work onto the main thread.
//!
//! - Producers on any thread call [`Scheduler::submit`] or
//!   [`Scheduler::submit_with_result`].
//! - The host main thread calls [`Scheduler::drain`] from its idle hook;
//!   each call runs at most one task, in submission order.
//! - Value-producing submissions return a [`Handle`]; [`Handle::get`]
//!   blocks until the task has run.
//!
//! With `notify_host = true` a submission also asks the host to run its
//! idle cycle soon. Use that from background threads. Inside host hooks
//! submit with `notify_host = false` (see [`HostIdleTrigger`]).
//!
//! # Example
//!
//! ```ignore
//! use idlesync_core::tasks::{schedule_task, schedule_task_with_result};
//!
//! // In a listener thread waiting for external commands
//! fn external_command_received() {
//!     schedule_task(|| {
//!         // Runs on the main thread
//!     }, true)
//!     .ok();
//!
//!     let handle = schedule_task_with_result(|| 2 + 2, true).unwrap();
//!     assert_eq!(handle.get(), Ok(4));
//! }
//! ```

pub mod cell;
pub mod error;
pub mod global;
pub mod queue;
pub mod scheduler;
pub mod strategy;
pub mod trigger;

pub use cell::{result_cell, CellWriter, Handle};
pub use error::{SchedulerError, TaskError, TaskResult};
pub use global::{
    install, schedule_or_execute, schedule_task, schedule_task_with_result, scheduler,
    try_scheduler,
};
pub use queue::{Task, TaskQueue};
pub use scheduler::{Scheduler, ShutdownPolicy};
pub use strategy::ExecutionMode;
pub use trigger::{HostIdleTrigger, IdleTrigger};
