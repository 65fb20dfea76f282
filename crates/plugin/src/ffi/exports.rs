//! C-compatible exports called by the host shim

use std::ffi::{c_char, c_void};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use tracing::instrument;
use tracing_subscriber::EnvFilter;

use idlesync_core::hooks;
use idlesync_core::tasks::{self, HostIdleTrigger, Scheduler};
use idlesync_core::CoreConfig;
use idlesync_host::{init_host, HostGlobals};
use idlesync_sdk::{A_Err, A_long, IdleHookFn, IdleTriggerFn, A_ERR_GENERIC, A_ERR_NONE};

// The idle export must match the hook signature the host registers.
const _: IdleHookFn = rust_on_idle;

/// Called when the host loads the plugin, on the host main thread
///
/// # Safety
/// - `idle_trigger` must be the host's `CauseIdleRoutinesToBeCalled` entry
///   point or null
/// - `error` must be a valid pointer to a buffer of at least `maxlen` bytes, or null
#[no_mangle]
#[instrument(skip_all)]
pub unsafe extern "C" fn rust_plugin_load(
    idle_trigger: Option<IdleTriggerFn>,
    error: *mut c_char,
    maxlen: usize,
) -> bool {
    guard_panic(error, maxlen, "load", || load(idle_trigger, error, maxlen))
}

/// Body of `rust_plugin_load`
///
/// # Safety
/// Same as `rust_plugin_load`
unsafe fn load(idle_trigger: Option<IdleTriggerFn>, error: *mut c_char, maxlen: usize) -> bool {
    let (config, config_error) = match CoreConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (CoreConfig::default(), Some(e)),
    };

    // Initialize tracing subscriber; RUST_LOG overrides the config level
    let level = if config.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    tracing::info!("idlesync loading...");
    if let Some(e) = config_error {
        tracing::warn!("Using default core config: {}", e);
    }

    let globals = match HostGlobals::new(idle_trigger) {
        Ok(g) => g,
        Err(e) => {
            tracing::error!("Invalid host entry points: {}", e);
            write_error(error, maxlen, &format!("Host error: {}", e));
            return false;
        }
    };

    if let Err(e) = init_host(globals) {
        tracing::error!("Failed to init host: {}", e);
        write_error(error, maxlen, &e.to_string());
        return false;
    }

    let mut scheduler = Scheduler::from_config(&config);
    if config.notify_host {
        scheduler = scheduler.with_idle_trigger(Arc::new(HostIdleTrigger));
    }

    if let Err(e) = tasks::install(scheduler) {
        tracing::error!("Failed to install scheduler: {}", e);
        write_error(error, maxlen, &e.to_string());
        return false;
    }

    tracing::info!("idlesync loaded ({:?} mode)", config.mode);
    tracing::info!("Main thread ID: {:?}", std::thread::current().id());

    true
}

/// Idle hook registered with the host
///
/// Runs at most one queued task per call. When more work is waiting,
/// `max_sleep` is set to zero so the host calls back right away.
///
/// # Safety
/// - `max_sleep` must be a valid pointer or null
#[no_mangle]
pub unsafe extern "C" fn rust_on_idle(_refcon: *mut c_void, max_sleep: *mut A_long) -> A_Err {
    match std::panic::catch_unwind(hooks::on_idle) {
        Ok(report) => {
            if report.wants_more() && !max_sleep.is_null() {
                *max_sleep = 0;
            }
            A_ERR_NONE
        }
        Err(_) => {
            tracing::error!("Panic in idle hook");
            A_ERR_GENERIC
        }
    }
}

/// Number of tasks waiting for the main thread
#[no_mangle]
pub extern "C" fn rust_pending_tasks() -> usize {
    tasks::try_scheduler().map(Scheduler::pending).unwrap_or(0)
}

/// Called when the host unloads the plugin
///
/// # Safety
/// - `error` must be a valid pointer to a buffer of at least `maxlen` bytes, or null
#[no_mangle]
#[instrument(skip_all)]
pub unsafe extern "C" fn rust_plugin_unload(error: *mut c_char, maxlen: usize) -> bool {
    tracing::info!("idlesync unloading...");

    guard_panic(error, maxlen, "shutdown", || {
        crate::shutdown();
        true
    })
}

/// Run an export body, turning a panic into `false` and an error message
///
/// # Safety
/// - `error` must be a valid pointer to a buffer of at least `maxlen` bytes, or null
unsafe fn guard_panic<F>(error: *mut c_char, maxlen: usize, stage: &str, body: F) -> bool
where
    F: FnOnce() -> bool,
{
    match std::panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(ok) => ok,
        Err(_) => {
            let msg = format!("Panic during {}", stage);
            tracing::error!("{}", msg);
            write_error(error, maxlen, &msg);
            false
        }
    }
}

/// Helper to write an error message to a C buffer
///
/// # Safety
/// - `error` must be a valid pointer or null
/// - `maxlen` must accurately reflect the buffer size
unsafe fn write_error(error: *mut c_char, maxlen: usize, msg: &str) {
    if !error.is_null() && maxlen > 0 {
        let bytes = msg.as_bytes();
        let len = bytes.len().min(maxlen - 1);
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), error as *mut u8, len);
        *error.add(len) = 0;
    }
}
