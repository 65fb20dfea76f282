//! Idle routine entry points
//!
//! The host processes plugin work during its idle cycle. Plugins may ask
//! the host to run that cycle soon through a utility suite function.

use crate::types::{A_Err, A_long};

/// Host function that asks the host to call idle routines soon
/// (`AEGP_CauseIdleRoutinesToBeCalled` in the utility suite).
pub type IdleTriggerFn = unsafe extern "C" fn() -> A_Err;

/// Signature of the idle hook the host invokes on its main thread.
///
/// `max_sleep` lets the plugin shorten the host's next sleep interval.
pub type IdleHookFn = unsafe extern "C" fn(refcon: *mut std::ffi::c_void, max_sleep: *mut A_long) -> A_Err;
