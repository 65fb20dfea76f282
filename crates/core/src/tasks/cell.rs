//! One-shot result cell
//!
//! Bridges the outcome of a queued task back to the thread that submitted
//! it. The cell is split into two owned halves:
//! - [`CellWriter`] travels with the task and is consumed when it writes
//! - [`Handle`] stays with the caller and is consumed when it reads
//!
//! Each half can only be used once, so the cell goes from unset to set at
//! most once and is read at most once.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use super::error::{TaskError, TaskResult};

/// State shared by both halves of a cell
struct Shared<T> {
    /// `None` until the writer has stored an outcome
    outcome: Mutex<Option<TaskResult<T>>>,
    ready: Condvar,
}

/// Create a new empty cell, returning the writer and reader halves
pub fn result_cell<T>() -> (CellWriter<T>, Handle<T>) {
    let shared = Arc::new(Shared {
        outcome: Mutex::new(None),
        ready: Condvar::new(),
    });

    (
        CellWriter {
            shared: Some(Arc::clone(&shared)),
        },
        Handle { shared },
    )
}

/// Write half of a result cell, owned by the task wrapper
///
/// Dropping a writer without calling [`CellWriter::set`] resolves the cell
/// to [`TaskError::Abandoned`], so a reader never waits on a task that no
/// longer exists.
pub struct CellWriter<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> CellWriter<T> {
    /// Store the outcome and wake the reader
    pub fn set(mut self, outcome: TaskResult<T>) {
        self.publish(outcome);
    }

    fn publish(&mut self, outcome: TaskResult<T>) {
        if let Some(shared) = self.shared.take() {
            *shared.outcome.lock() = Some(outcome);
            shared.ready.notify_all();
        }
    }
}

impl<T> Drop for CellWriter<T> {
    fn drop(&mut self) {
        self.publish(Err(TaskError::Abandoned));
    }
}

/// Read half of a result cell, held by the submitting thread
///
/// A handle that is never read can be dropped at any time.
pub struct Handle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Handle<T> {
    /// Block until the task has run, then return its outcome
    ///
    /// There is no timeout: if the task is never drained this blocks
    /// forever. Never call this on the host main thread for a queued task,
    /// since that thread is the one that has to drain it.
    pub fn get(self) -> TaskResult<T> {
        let mut outcome = self.shared.outcome.lock();
        loop {
            if let Some(result) = outcome.take() {
                return result;
            }
            self.shared.ready.wait(&mut outcome);
        }
    }

    /// Return the outcome if it is available, or the handle back if not
    pub fn try_get(self) -> Result<TaskResult<T>, Self> {
        let taken = self.shared.outcome.lock().take();
        match taken {
            Some(result) => Ok(result),
            None => Err(self),
        }
    }

    /// Whether the task has completed
    pub fn is_ready(&self) -> bool {
        self.shared.outcome.lock().is_some()
    }
}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_set_then_get() {
        let (writer, handle) = result_cell();
        assert!(!handle.is_ready());

        writer.set(Ok("comp 1".to_string()));

        assert!(handle.is_ready());
        assert_eq!(handle.get(), Ok("comp 1".to_string()));
    }

    #[test]
    fn test_failure_is_returned() {
        let (writer, handle) = result_cell::<i32>();
        writer.set(Err(TaskError::Panicked("boom".to_string())));
        assert_eq!(handle.get(), Err(TaskError::Panicked("boom".to_string())));
    }

    #[test]
    fn test_dropped_writer_abandons() {
        let (writer, handle) = result_cell::<i32>();
        drop(writer);
        assert_eq!(handle.get(), Err(TaskError::Abandoned));
    }

    #[test]
    fn test_set_does_not_report_abandoned() {
        // The writer is consumed by set(); its Drop must not overwrite the value.
        let (writer, handle) = result_cell();
        writer.set(Ok(5));
        assert_eq!(handle.get(), Ok(5));
    }

    #[test]
    fn test_try_get_pending_returns_handle() {
        let (writer, handle) = result_cell();

        let handle = match handle.try_get() {
            Ok(_) => panic!("cell should still be empty"),
            Err(handle) => handle,
        };

        writer.set(Ok(1));
        assert_eq!(handle.try_get().ok(), Some(Ok(1)));
    }

    #[test]
    fn test_get_blocks_until_set() {
        let (writer, handle) = result_cell();

        let reader = thread::spawn(move || handle.get());

        thread::sleep(Duration::from_millis(50));
        assert!(!reader.is_finished());

        writer.set(Ok(99u64));
        assert_eq!(reader.join().unwrap(), Ok(99));
    }

    #[test]
    fn test_dropped_handle_is_harmless() {
        let (writer, handle) = result_cell();
        drop(handle);
        writer.set(Ok(vec![1, 2, 3]));
    }
}
