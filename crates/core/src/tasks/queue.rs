//! Main thread task queue
//!
//! Background threads append work; the host main thread removes and runs
//! one task per drain call during its idle cycle.

use std::collections::VecDeque;

use parking_lot::Mutex;

/// A task to execute on the main thread
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// FIFO queue of deferred tasks
///
/// The lock is only held to push or pop. Tasks always run after the lock
/// is released, so a slow task never stalls producers. The queue has no
/// capacity limit; if nothing drains it, it grows without bound.
#[derive(Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task at the tail
    ///
    /// Safe to call from any thread. Never runs the task.
    pub fn enqueue(&self, task: Task) {
        self.tasks.lock().push_back(task);
    }

    /// Remove the head task and run it on the calling thread
    ///
    /// Runs at most one task. Returns `false` without blocking if the queue
    /// was empty.
    pub fn drain_one(&self) -> bool {
        // The guard is dropped at the end of this statement.
        let next = self.tasks.lock().pop_front();

        match next {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Number of tasks waiting to run
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Check if no tasks are waiting
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Remove every pending task without running it
    pub(crate) fn take_all(&self) -> VecDeque<Task> {
        std::mem::take(&mut *self.tasks.lock())
    }
}
