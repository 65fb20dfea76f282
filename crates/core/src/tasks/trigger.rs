//! Host idle trigger
//!
//! Submissions can ask the host to run its idle cycle soon so queued work
//! is picked up without waiting for the next regular idle call.

use idlesync_host::try_host;

/// Something that asks the host to run its idle routines soon
///
/// Called from producer threads after a task is queued. Implementations
/// must be fire-and-forget: they must not run queued work themselves.
pub trait IdleTrigger: Send + Sync {
    /// Request an idle cycle
    fn request_idle(&self);
}

impl<F> IdleTrigger for F
where
    F: Fn() + Send + Sync,
{
    fn request_idle(&self) {
        self()
    }
}

/// Idle trigger backed by the host entry point stored at plugin load
///
/// # Warning
/// Do not submit with `notify_host = true` from inside a host command hook
/// or another host callback that is still active. Calling idle routines
/// while a hook is running can freeze or crash the host. Submit with
/// `notify_host = false` there and let the next regular idle cycle drain.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostIdleTrigger;

impl IdleTrigger for HostIdleTrigger {
    fn request_idle(&self) {
        match try_host() {
            Some(host) => {
                if let Err(e) = host.cause_idle_routines() {
                    tracing::warn!("Idle request failed: {}", e);
                }
            }
            None => tracing::debug!("Idle requested before host was initialized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_closure_trigger() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let trigger: Arc<dyn IdleTrigger> = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        trigger.request_idle();
        trigger.request_idle();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_host_trigger_without_host_is_noop() {
        // Host globals are never initialized in unit tests.
        HostIdleTrigger.request_idle();
    }
}
