//! Global host state storage
//!
//! Host entry points are acquired once during plugin load and stored here.
//! Access is thread-safe via OnceLock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::thread::ThreadId;

use idlesync_sdk::{describe_err, IdleTriggerFn, A_ERR_NONE};

use crate::error::HostError;

/// Global host state
pub struct HostGlobals {
    /// Utility suite `CauseIdleRoutinesToBeCalled`
    idle_trigger: IdleTriggerFn,

    /// Number of idle requests sent to the host
    idle_requests: AtomicU64,

    /// Host main thread ID for thread affinity checks
    pub main_thread_id: ThreadId,
}

/// Global host state storage
static HOST: OnceLock<HostGlobals> = OnceLock::new();

/// Initialize host globals
///
/// Called once during plugin load. Returns error if already initialized.
pub fn init_host(globals: HostGlobals) -> Result<(), HostError> {
    let main_thread_id = globals.main_thread_id;
    HOST.set(globals).map_err(|_| HostError::AlreadyInitialized)?;
    tracing::debug!("Host globals set, main thread {:?}", main_thread_id);
    Ok(())
}

/// Try to get host globals without panicking
pub fn try_host() -> Option<&'static HostGlobals> {
    HOST.get()
}

/// Check if current thread is the host main thread
pub fn is_main_thread() -> bool {
    HOST.get()
        .map(|g| g.is_main_thread())
        .unwrap_or(false)
}

impl HostGlobals {
    /// Create new HostGlobals
    ///
    /// Must be called on the host's main thread; the current thread is
    /// recorded as the main thread.
    ///
    /// # Arguments
    /// * `idle_trigger` - Host function requesting an idle cycle
    pub fn new(idle_trigger: Option<IdleTriggerFn>) -> Result<Self, HostError> {
        let idle_trigger =
            idle_trigger.ok_or(HostError::NullEntryPoint("CauseIdleRoutinesToBeCalled"))?;

        Ok(Self {
            idle_trigger,
            idle_requests: AtomicU64::new(0),
            main_thread_id: std::thread::current().id(),
        })
    }

    /// Check if the current thread is this host's main thread
    pub fn is_main_thread(&self) -> bool {
        std::thread::current().id() == self.main_thread_id
    }

    /// Ask the host to run its idle routines soon
    ///
    /// Safe to call from any thread; the host only records the request.
    pub fn cause_idle_routines(&self) -> Result<(), HostError> {
        self.idle_requests.fetch_add(1, Ordering::Relaxed);

        // SAFETY: the entry point was provided by the host at load time and
        // stays valid for the plugin's lifetime.
        let code = unsafe { (self.idle_trigger)() };
        if code == A_ERR_NONE {
            Ok(())
        } else {
            Err(HostError::CallFailed {
                call: "CauseIdleRoutinesToBeCalled",
                code,
                description: describe_err(code),
            })
        }
    }

    /// Number of idle requests sent so far
    pub fn idle_requests(&self) -> u64 {
        self.idle_requests.load(Ordering::Relaxed)
    }
}
