//! Cross-thread task scheduler
//!
//! Owns the task queue, wraps submitted closures and pings the host idle
//! trigger. See the module docs of [`crate::tasks`] for the threading model.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::cell::{result_cell, Handle};
use super::error::capture;
use super::queue::{Task, TaskQueue};
use super::strategy::{execute_now, ExecutionMode};
use super::trigger::IdleTrigger;
use crate::config::CoreConfig;

/// What to do with queued tasks on shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPolicy {
    /// Run every pending task on the calling thread
    Drain,
    /// Drop every pending task; their handles resolve to `Abandoned`
    Discard,
}

/// Moves work from any thread onto the host main thread
pub struct Scheduler {
    queue: TaskQueue,
    mode: ExecutionMode,
    trigger: Option<Arc<dyn IdleTrigger>>,
    report_discarded_failures: bool,
    slow_task_threshold: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(ExecutionMode::default())
    }
}

impl Scheduler {
    /// Create a scheduler with no idle trigger
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            queue: TaskQueue::new(),
            mode,
            trigger: None,
            report_discarded_failures: false,
            slow_task_threshold: Duration::from_millis(16),
        }
    }

    /// Create a scheduler from the core configuration
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.mode)
            .with_failure_reporting(config.report_discarded_failures)
            .with_slow_task_threshold(Duration::from_millis(config.slow_task_warn_ms))
    }

    /// Set the trigger called by submissions with `notify_host = true`
    pub fn with_idle_trigger(mut self, trigger: Arc<dyn IdleTrigger>) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Log failures that would otherwise be discarded silently
    pub fn with_failure_reporting(mut self, enabled: bool) -> Self {
        self.report_discarded_failures = enabled;
        self
    }

    /// Set how long one drained task may run before a warning is logged
    pub fn with_slow_task_threshold(mut self, threshold: Duration) -> Self {
        self.slow_task_threshold = threshold;
        self
    }

    /// The strategy used by `schedule_or_execute`
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Slow task warning threshold
    pub fn slow_task_threshold(&self) -> Duration {
        self.slow_task_threshold
    }

    /// Number of tasks waiting to be drained
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue a task with no result
    ///
    /// Safe to call from any thread. Returns immediately without running
    /// the task. A panic in the task is caught on the main thread and not
    /// reported to the submitter.
    ///
    /// # Arguments
    /// * `task` - Work to run on the main thread
    /// * `notify_host` - Ask the host to run its idle cycle soon
    pub fn submit<F>(&self, task: F, notify_host: bool)
    where
        F: FnOnce() + Send + 'static,
    {
        let report = self.report_discarded_failures;
        self.enqueue(
            Box::new(move || {
                if let Err(e) = capture(task) {
                    if report {
                        tracing::warn!("Discarded failure from queued task: {}", e);
                    }
                }
            }),
            notify_host,
        );
    }

    /// Queue a task and get a handle to its result
    ///
    /// The returned handle is not ready until the task has been drained.
    /// A panic in the task is delivered to the handle as
    /// [`TaskError::Panicked`](super::TaskError::Panicked).
    ///
    /// # Example
    ///
    /// ```ignore
    /// let handle = scheduler.submit_with_result(|| active_comp_name(), true);
    /// // ... on a background thread, while the main thread drains ...
    /// let name = handle.get()?;
    /// ```
    pub fn submit_with_result<T, F>(&self, task: F, notify_host: bool) -> Handle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (writer, handle) = result_cell();
        self.enqueue(Box::new(move || writer.set(capture(task))), notify_host);
        handle
    }

    /// Queue or run a task depending on the execution mode
    ///
    /// - [`ExecutionMode::Queued`]: same as `submit_with_result(task, true)`
    /// - [`ExecutionMode::Immediate`]: runs `task` on the calling thread and
    ///   returns a ready handle; a panic resolves the handle to
    ///   [`TaskError::Discarded`](super::TaskError::Discarded)
    pub fn schedule_or_execute<T, F>(&self, task: F) -> Handle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        match self.mode {
            ExecutionMode::Queued => self.submit_with_result(task, true),
            ExecutionMode::Immediate => execute_now(task, self.report_discarded_failures),
        }
    }

    /// Run the next queued task, if any
    ///
    /// Must only be called from the host main thread, and never from two
    /// threads at once. Runs at most one task per call; the host idle cycle
    /// calls this repeatedly to work through a backlog.
    ///
    /// Returns `true` if a task was run.
    pub fn drain(&self) -> bool {
        if idlesync_host::try_host().is_some() && !idlesync_host::is_main_thread() {
            tracing::debug!(
                "drain called off the host main thread ({:?})",
                std::thread::current().id()
            );
        }

        let start = Instant::now();
        let ran = self.queue.drain_one();

        if ran {
            let elapsed = start.elapsed();
            tracing::trace!("Drained task in {:?}, {} pending", elapsed, self.pending());
            if elapsed > self.slow_task_threshold {
                tracing::warn!(
                    "Main thread task took {}ms ({} still pending)",
                    elapsed.as_millis(),
                    self.pending()
                );
            }
        }

        ran
    }

    /// Empty the queue according to `policy`
    ///
    /// Only the tasks queued when this is called are affected. Tasks they
    /// submit while running stay queued, so a task that re-submits itself
    /// cannot keep shutdown from returning.
    ///
    /// Returns the number of tasks that were run or dropped. The scheduler
    /// stays usable afterwards.
    pub fn shutdown(&self, policy: ShutdownPolicy) -> usize {
        let snapshot = self.queue.take_all();
        let count = snapshot.len();

        match policy {
            ShutdownPolicy::Drain => {
                for task in snapshot {
                    task();
                }
            }
            ShutdownPolicy::Discard => drop(snapshot),
        }

        if count > 0 {
            tracing::debug!("Scheduler shutdown ({:?}): {} tasks", policy, count);
        }
        count
    }

    fn enqueue(&self, task: Task, notify_host: bool) {
        self.queue.enqueue(task);

        // Outside the queue lock: the host may call straight back into drain().
        if notify_host {
            if let Some(trigger) = &self.trigger {
                trigger.request_idle();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskError;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, OnceLock};
    use std::thread;

    fn counting_trigger() -> (Arc<dyn IdleTrigger>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let trigger: Arc<dyn IdleTrigger> = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (trigger, calls)
    }

    #[test]
    fn test_submit_fifo_order() {
        let scheduler = Scheduler::new(ExecutionMode::Queued);
        let log = Arc::new(Mutex::new(Vec::new()));

        for id in 1..=10 {
            let log = Arc::clone(&log);
            scheduler.submit(move || log.lock().push(id), false);
        }

        for _ in 0..10 {
            assert!(scheduler.drain());
        }

        assert_eq!(*log.lock(), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_submit_does_not_run_task() {
        let scheduler = Scheduler::new(ExecutionMode::Queued);
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        scheduler.submit(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            true,
        );

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_extra_drain_is_noop() {
        let scheduler = Scheduler::default();
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let runs = Arc::clone(&runs);
            scheduler.submit(
                move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                },
                false,
            );
        }

        for _ in 0..4 {
            assert!(scheduler.drain());
        }
        assert_eq!(scheduler.pending(), 0);
        assert!(!scheduler.drain());
        assert_eq!(runs.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_result_value_delivered() {
        let scheduler = Scheduler::new(ExecutionMode::Queued);
        let handle = scheduler.submit_with_result(|| "Comp 1".to_string(), false);

        assert!(!handle.is_ready());
        scheduler.drain();
        assert_eq!(handle.get(), Ok("Comp 1".to_string()));
    }

    #[test]
    fn test_result_failure_delivered() {
        let scheduler = Scheduler::new(ExecutionMode::Queued);
        let handle: Handle<u32> =
            scheduler.submit_with_result(|| panic!("layer index 4 invalid"), false);

        // The panic must not escape drain().
        assert!(scheduler.drain());
        assert_eq!(
            handle.get(),
            Err(TaskError::Panicked("layer index 4 invalid".to_string()))
        );
    }

    #[test]
    fn test_result_err_value_passes_through() {
        let scheduler = Scheduler::new(ExecutionMode::Queued);
        let handle = scheduler.submit_with_result(
            || -> Result<i32, String> { Err("no mask".into()) },
            false,
        );

        scheduler.drain();
        assert_eq!(handle.get(), Ok(Err("no mask".to_string())));
    }

    #[test]
    fn test_void_panic_is_contained() {
        let scheduler = Scheduler::new(ExecutionMode::Queued).with_failure_reporting(true);
        let after = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&after);

        scheduler.submit(|| panic!("fire and forget"), false);
        scheduler.submit(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            false,
        );

        assert!(scheduler.drain());
        assert!(scheduler.drain());
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_idle_trigger_called_once_per_notifying_submit() {
        let (trigger, calls) = counting_trigger();
        let scheduler = Scheduler::new(ExecutionMode::Queued).with_idle_trigger(trigger);

        scheduler.submit(|| {}, true);
        scheduler.submit(|| {}, true);
        let _handle = scheduler.submit_with_result(|| 1, true);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        scheduler.submit(|| {}, false);
        let _handle = scheduler.submit_with_result(|| 2, false);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_trigger_can_drain_reentrantly() {
        // A host may run its idle cycle from inside the trigger call.
        let slot: Arc<OnceLock<Arc<Scheduler>>> = Arc::new(OnceLock::new());
        let inner = Arc::clone(&slot);
        let trigger: Arc<dyn IdleTrigger> = Arc::new(move || {
            if let Some(scheduler) = inner.get() {
                scheduler.drain();
            }
        });

        let scheduler = Arc::new(Scheduler::new(ExecutionMode::Queued).with_idle_trigger(trigger));
        assert!(slot.set(Arc::clone(&scheduler)).is_ok());

        let handle = scheduler.submit_with_result(|| "drained", true);

        assert_eq!(scheduler.pending(), 0);
        assert_eq!(handle.get(), Ok("drained"));
    }

    #[test]
    fn test_concurrent_submit_each_task_once() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 50;

        let scheduler = Arc::new(Scheduler::new(ExecutionMode::Queued));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let producers: Vec<_> = (0..THREADS)
            .map(|t| {
                let scheduler = Arc::clone(&scheduler);
                let seen = Arc::clone(&seen);
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        let seen = Arc::clone(&seen);
                        scheduler.submit(move || seen.lock().push((t, i)), false);
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.join().unwrap();
        }

        let total = THREADS * PER_THREAD;
        for _ in 0..total {
            assert!(scheduler.drain());
        }
        assert!(!scheduler.drain());

        let seen = seen.lock();
        assert_eq!(seen.len(), total);
        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(unique.len(), total);

        // Per-producer order is preserved.
        for t in 0..THREADS {
            let order: Vec<_> = seen
                .iter()
                .filter(|(producer, _)| *producer == t)
                .map(|(_, i)| *i)
                .collect();
            assert_eq!(order, (0..PER_THREAD).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_drain_while_producers_submit() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 100;
        let total = THREADS * PER_THREAD;

        let scheduler = Arc::new(Scheduler::new(ExecutionMode::Queued));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let producers: Vec<_> = (0..THREADS)
            .map(|t| {
                let scheduler = Arc::clone(&scheduler);
                let seen = Arc::clone(&seen);
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        let seen = Arc::clone(&seen);
                        scheduler.submit(move || seen.lock().push((t, i)), false);
                        if i % 10 == 0 {
                            thread::yield_now();
                        }
                    }
                })
            })
            .collect();

        // This thread plays the host main thread, draining as work arrives.
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut drained = 0;
        while drained < total {
            assert!(Instant::now() < deadline, "only {} of {} tasks drained", drained, total);
            if scheduler.drain() {
                drained += 1;
            } else {
                thread::yield_now();
            }
        }

        for producer in producers {
            producer.join().unwrap();
        }
        assert!(!scheduler.drain());

        let seen = seen.lock();
        assert_eq!(seen.len(), total);
        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(unique.len(), total);

        for t in 0..THREADS {
            let order: Vec<_> = seen
                .iter()
                .filter(|(producer, _)| *producer == t)
                .map(|(_, i)| *i)
                .collect();
            assert_eq!(order, (0..PER_THREAD).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_get_waits_for_main_thread_drain() {
        let scheduler = Arc::new(Scheduler::new(ExecutionMode::Queued));
        let (tx, rx) = mpsc::channel();

        let producer = {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                let handle = scheduler.submit_with_result(|| 6 * 7, false);
                tx.send(()).unwrap();
                handle.get()
            })
        };

        rx.recv().unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());

        assert!(scheduler.drain());
        assert_eq!(producer.join().unwrap(), Ok(42));
    }

    #[test]
    fn test_schedule_or_execute_queued() {
        let (trigger, calls) = counting_trigger();
        let scheduler = Scheduler::new(ExecutionMode::Queued).with_idle_trigger(trigger);

        let handle = scheduler.schedule_or_execute(|| 3);

        assert!(!handle.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        scheduler.drain();
        assert_eq!(handle.get(), Ok(3));
    }

    #[test]
    fn test_schedule_or_execute_queued_keeps_failure() {
        let scheduler = Scheduler::new(ExecutionMode::Queued);
        let handle: Handle<()> = scheduler.schedule_or_execute(|| panic!("stream gone"));

        scheduler.drain();
        assert_eq!(
            handle.get(),
            Err(TaskError::Panicked("stream gone".to_string()))
        );
    }

    #[test]
    fn test_schedule_or_execute_immediate() {
        let (trigger, calls) = counting_trigger();
        let scheduler = Scheduler::new(ExecutionMode::Immediate).with_idle_trigger(trigger);
        let caller = thread::current().id();

        let handle = scheduler.schedule_or_execute(move || thread::current().id() == caller);

        assert!(handle.is_ready());
        assert_eq!(handle.get(), Ok(true));
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schedule_or_execute_immediate_discards_failure() {
        let scheduler = Scheduler::new(ExecutionMode::Immediate);
        let handle: Handle<i32> = scheduler.schedule_or_execute(|| panic!("hidden"));
        assert_eq!(handle.get(), Err(TaskError::Discarded));
    }

    #[test]
    fn test_shutdown_discard_abandons_handles() {
        let scheduler = Scheduler::new(ExecutionMode::Queued);
        let first = scheduler.submit_with_result(|| 1, false);
        let second = scheduler.submit_with_result(|| 2, false);

        assert_eq!(scheduler.shutdown(ShutdownPolicy::Discard), 2);

        assert_eq!(first.get(), Err(TaskError::Abandoned));
        assert_eq!(second.get(), Err(TaskError::Abandoned));
        assert!(!scheduler.drain());
    }

    #[test]
    fn test_shutdown_drain_runs_everything() {
        let scheduler = Scheduler::new(ExecutionMode::Queued);
        let first = scheduler.submit_with_result(|| 1, false);
        scheduler.submit(|| {}, false);

        assert_eq!(scheduler.shutdown(ShutdownPolicy::Drain), 2);
        assert_eq!(first.get(), Ok(1));
        assert_eq!(scheduler.pending(), 0);
    }

    fn submit_repeating(scheduler: &Arc<Scheduler>, runs: &Arc<AtomicUsize>) {
        let next = Arc::clone(scheduler);
        let runs = Arc::clone(runs);
        scheduler.submit(
            move || {
                runs.fetch_add(1, Ordering::SeqCst);
                submit_repeating(&next, &runs);
            },
            false,
        );
    }

    #[test]
    fn test_shutdown_drain_stops_at_snapshot() {
        let scheduler = Arc::new(Scheduler::new(ExecutionMode::Queued));
        let runs = Arc::new(AtomicUsize::new(0));
        submit_repeating(&scheduler, &runs);
        let last = scheduler.submit_with_result(|| "last", false);

        let (tx, rx) = mpsc::channel();
        {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                let _ = tx.send(scheduler.shutdown(ShutdownPolicy::Drain));
            });
        }

        let count = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("shutdown(Drain) kept running re-submitted tasks");

        assert_eq!(count, 2);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last.get(), Ok("last"));
        // The re-submitted task is left for the next drain.
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.shutdown(ShutdownPolicy::Discard), 1);
    }

    #[test]
    fn test_from_config() {
        let config = CoreConfig {
            mode: ExecutionMode::Immediate,
            slow_task_warn_ms: 40,
            ..CoreConfig::default()
        };

        let scheduler = Scheduler::from_config(&config);
        assert_eq!(scheduler.mode(), ExecutionMode::Immediate);
        assert_eq!(scheduler.slow_task_threshold(), Duration::from_millis(40));
    }
}
