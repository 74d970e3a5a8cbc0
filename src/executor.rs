//! Serial executor: one dedicated thread draining its own queue in order

use crate::core::{BoxedJob, ClosureJob, Job, PoolError, Result, Task};
use crate::queue::BlockingQueue;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Lifecycle of the executor, stored as a single atomic value.
///
/// Transitions: `Stopped → Running` ([`SerialExecutor::start`]),
/// `Running → Stopping` ([`SerialExecutor::stop`]), and `* → Stopped`
/// ([`SerialExecutor::terminate`] or the consumer observing a sentinel).
/// Invalid transitions are rejected instead of overlapping flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Stopped = 0,
    Running = 1,
    Stopping = 2,
}

impl Lifecycle {
    fn from_u8(value: u8) -> Lifecycle {
        match value {
            0 => Lifecycle::Stopped,
            1 => Lifecycle::Running,
            2 => Lifecycle::Stopping,
            _ => unreachable!("invalid lifecycle value {}", value),
        }
    }
}

/// A single dedicated thread draining its own FIFO queue strictly in order.
///
/// Jobs dispatched to one executor run in submission order, one fully
/// completed before the next begins. The lifecycle supports a graceful
/// drain-then-stop ([`stop`]) and an immediate terminate that returns the
/// unstarted jobs ([`terminate`]); a stopped executor can be restarted with
/// [`start`] any number of times.
///
/// Lifecycle calls racing from several threads are kept consistent by the
/// atomic transition table, but the intended usage is a single controlling
/// thread driving start/stop/terminate/dispatch sequentially.
///
/// Callers must eventually call [`join`] or [`terminate`], or the consumer
/// thread blocks forever on an empty queue.
///
/// # Example
///
/// ```rust
/// use workpool::prelude::*;
///
/// # fn main() -> Result<()> {
/// let executor = SerialExecutor::new()?;
/// for i in 1..=3 {
///     executor.dispatch(move || {
///         println!("step {}", i);
///         Ok(())
///     })?;
/// }
/// executor.join()?;
/// # Ok(())
/// # }
/// ```
///
/// [`start`]: SerialExecutor::start
/// [`stop`]: SerialExecutor::stop
/// [`terminate`]: SerialExecutor::terminate
/// [`join`]: SerialExecutor::join
pub struct SerialExecutor {
    queue: Arc<BlockingQueue<Task>>,
    state: Arc<AtomicU8>,
    processing: Arc<AtomicBool>,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SerialExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialExecutor")
            .field("lifecycle", &self.lifecycle())
            .field("processing", &self.processing.load(Ordering::Acquire))
            .field("queue_len", &self.queue.len())
            .finish()
    }
}

impl SerialExecutor {
    /// Create an executor and immediately start its consumer thread.
    pub fn new() -> Result<Self> {
        let executor = Self::stopped();
        executor.start()?;
        Ok(executor)
    }

    /// Create an executor without starting it.
    ///
    /// Work may be dispatched right away; it queues up until [`start`]
    /// is called.
    ///
    /// [`start`]: SerialExecutor::start
    pub fn stopped() -> Self {
        Self {
            queue: Arc::new(BlockingQueue::new()),
            state: Arc::new(AtomicU8::new(Lifecycle::Stopped as u8)),
            processing: Arc::new(AtomicBool::new(false)),
            consumer: Mutex::new(None),
        }
    }

    /// Start the consumer thread.
    ///
    /// If the executor is already running this performs a full [`join`]
    /// first, and while a previous stop is still draining this blocks
    /// until the drain completes, so at most one live consumer thread
    /// ever exists.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::AlreadyRunning`] if another thread started the
    /// executor concurrently, and a spawn error if the thread cannot be
    /// created.
    ///
    /// [`join`]: SerialExecutor::join
    pub fn start(&self) -> Result<()> {
        if self.lifecycle() == Lifecycle::Running {
            self.join()?;
        }
        // Reap the previous consumer, if any, before spawning a new one.
        // After terminate() the old thread exits on the queued sentinel;
        // after stop() this waits out the remaining drain.
        if let Some(handle) = self.consumer.lock().take() {
            handle
                .join()
                .map_err(|_| PoolError::join("serial-executor", "consumer thread panicked"))?;
        }
        // No consumer is alive at this point. Drop any sentinel left over
        // from terminate() racing the old consumer's exit, keeping the
        // queued work in FIFO order, so the new consumer cannot be killed
        // by a stale sentinel.
        for task in self.queue.drain() {
            if let Task::Run(job) = task {
                self.queue.push(Task::Run(job));
            }
        }

        self.state
            .compare_exchange(
                Lifecycle::Stopped as u8,
                Lifecycle::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| PoolError::AlreadyRunning)?;

        let queue = Arc::clone(&self.queue);
        let state = Arc::clone(&self.state);
        let processing = Arc::clone(&self.processing);
        let handle = thread::Builder::new()
            .name("serial-executor".to_string())
            .spawn(move || Self::run(queue, state, processing))
            .map_err(|e| {
                // Roll back so a later start() can retry.
                self.state
                    .store(Lifecycle::Stopped as u8, Ordering::Release);
                PoolError::spawn("serial-executor", e)
            })?;
        *self.consumer.lock() = Some(handle);
        log::debug!("serial executor started");
        Ok(())
    }

    /// Consumer loop: pop, run, repeat, until a termination sentinel.
    fn run(queue: Arc<BlockingQueue<Task>>, state: Arc<AtomicU8>, processing: Arc<AtomicBool>) {
        loop {
            match queue.pop() {
                Task::Run(job) => {
                    processing.store(true, Ordering::Release);
                    if let Err(e) = job.execute() {
                        log::error!("serial executor: job failed: {}", e);
                    }
                    processing.store(false, Ordering::Release);
                }
                Task::Terminate => {
                    state.store(Lifecycle::Stopped as u8, Ordering::Release);
                    log::debug!("serial executor consumer exiting");
                    break;
                }
            }
        }
    }

    /// Dispatch a closure for serial execution.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Stopping`] if [`stop`](SerialExecutor::stop)
    /// has been called and the drain has not completed; the queue is left
    /// untouched. Dispatching to a stopped executor is allowed; the work
    /// queues up for a later [`start`](SerialExecutor::start).
    pub fn dispatch<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.push(ClosureJob::new(f))
    }

    /// Dispatch a callable together with its positional arguments.
    pub fn dispatch_with<F, A>(&self, f: F, args: A) -> Result<()>
    where
        F: FnOnce(A) -> Result<()> + Send + 'static,
        A: Send + 'static,
    {
        self.push(ClosureJob::new(move || f(args)))
    }

    /// Enqueue a caller-defined [`Job`] value.
    ///
    /// Same stopping-state rejection as [`dispatch`](SerialExecutor::dispatch).
    pub fn push<J: Job + 'static>(&self, job: J) -> Result<()> {
        self.push_boxed(Box::new(job))
    }

    /// Enqueue an already-boxed job, e.g. one returned by
    /// [`terminate`](SerialExecutor::terminate).
    pub fn push_boxed(&self, job: BoxedJob) -> Result<()> {
        if self.lifecycle() == Lifecycle::Stopping {
            return Err(PoolError::stopping(self.queue.len()));
        }
        self.queue.push(Task::Run(job));
        Ok(())
    }

    /// Stop gracefully: everything already queued still runs, in order,
    /// before the consumer exits.
    ///
    /// Enqueues a termination sentinel as the last element and moves to the
    /// stopping state, in which dispatch is rejected. The consumer flips
    /// itself to stopped when it reaches the sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotRunning`] if the executor is stopped and
    /// [`PoolError::Stopping`] if a stop is already in progress.
    pub fn stop(&self) -> Result<()> {
        self.state
            .compare_exchange(
                Lifecycle::Running as u8,
                Lifecycle::Stopping as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|actual| match Lifecycle::from_u8(actual) {
                Lifecycle::Stopping => PoolError::stopping(self.queue.len()),
                _ => PoolError::NotRunning,
            })?;
        log::debug!("serial executor stopping, sentinel queued last");
        self.queue.push(Task::Terminate);
        Ok(())
    }

    /// Stop immediately and return the jobs that had not started.
    ///
    /// The job in flight, if any, always finishes first; terminate never
    /// interrupts it. Everything still sitting in the queue is drained and
    /// returned, and one sentinel is pushed to unblock the consumer's
    /// blocking pop so it observes the stop and exits.
    ///
    /// The sentinel is pushed whenever a consumer handle exists, even if
    /// the drain just swallowed an earlier sentinel, so repeated calls can
    /// never strand the consumer on an empty queue. A sentinel left behind
    /// by the consumer exiting early is purged by the next
    /// [`start`](SerialExecutor::start).
    pub fn terminate(&self) -> Vec<BoxedJob> {
        self.state.store(Lifecycle::Stopped as u8, Ordering::Release);
        let mut remaining = Vec::new();
        for task in self.queue.drain() {
            if let Task::Run(job) = task {
                remaining.push(job);
            }
        }
        if self.consumer.lock().is_some() {
            self.queue.push(Task::Terminate);
        }
        log::debug!(
            "serial executor terminated, {} unstarted jobs returned",
            remaining.len()
        );
        remaining
    }

    /// Stop gracefully and block until the consumer thread has exited.
    ///
    /// # Errors
    ///
    /// Returns a join error if the consumer thread had panicked.
    pub fn join(&self) -> Result<()> {
        match self.stop() {
            Ok(()) => {}
            // Already stopping or stopped: the sentinel is queued or the
            // consumer is already gone; joining below is still correct.
            Err(PoolError::Stopping { .. }) | Err(PoolError::NotRunning) => {}
            Err(e) => return Err(e),
        }
        if let Some(handle) = self.consumer.lock().take() {
            log::debug!("joining serial executor consumer");
            handle
                .join()
                .map_err(|_| PoolError::join("serial-executor", "consumer thread panicked"))?;
        }
        Ok(())
    }

    /// True while a stop is draining the queue.
    pub fn is_stopping(&self) -> bool {
        self.lifecycle() == Lifecycle::Stopping
    }

    /// True while the executor accepts and runs work.
    pub fn is_running(&self) -> bool {
        self.lifecycle() == Lifecycle::Running
    }

    /// True once the executor is fully stopped and no job is mid-execution.
    pub fn is_stopped(&self) -> bool {
        self.lifecycle() == Lifecycle::Stopped && !self.processing.load(Ordering::Acquire)
    }

    /// Number of jobs currently queued (approximate, diagnostics only).
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.state.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn test_new_auto_starts() {
        let executor = SerialExecutor::new().unwrap();
        assert!(executor.is_running());
        assert!(!executor.is_stopping());
        assert!(!executor.is_stopped());
        executor.join().unwrap();
        assert!(executor.is_stopped());
    }

    #[test]
    fn test_stopped_constructor_queues_work() {
        let executor = SerialExecutor::stopped();
        assert!(executor.is_stopped());

        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        executor
            .dispatch(move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        executor.start().unwrap();
        executor.join().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_rejected_when_not_running() {
        let executor = SerialExecutor::stopped();
        assert!(matches!(executor.stop(), Err(PoolError::NotRunning)));
    }

    #[test]
    fn test_terminate_when_stopped_pushes_no_sentinel() {
        let executor = SerialExecutor::stopped();
        executor.dispatch(|| Ok(())).unwrap();
        let drained = executor.terminate();
        assert_eq!(drained.len(), 1);
        assert!(executor.queue.is_empty());
    }

    #[test]
    fn test_drained_jobs_can_be_requeued() {
        let executor = SerialExecutor::stopped();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        executor
            .dispatch(move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        let drained = executor.terminate();
        assert_eq!(drained.len(), 1);

        executor.start().unwrap();
        for job in drained {
            executor.push_boxed(job).unwrap();
        }
        executor.join().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_job_error_does_not_kill_consumer() {
        let executor = SerialExecutor::new().unwrap();
        executor
            .dispatch(|| Err(PoolError::other("intentional failure")))
            .unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        executor
            .dispatch(move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        executor.join().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_terminate_waits_out_inflight_job() {
        let executor = SerialExecutor::new().unwrap();
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let finished = Arc::new(AtomicBool::new(false));
        let f = Arc::clone(&finished);
        executor
            .dispatch(move || {
                started_tx.send(()).ok();
                thread::sleep(Duration::from_millis(100));
                f.store(true, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        started_rx.recv().unwrap();
        let drained = executor.terminate();
        assert!(drained.is_empty());

        // The in-flight job is never interrupted.
        executor.join().unwrap();
        assert!(finished.load(Ordering::SeqCst));
        assert!(executor.is_stopped());
    }
}
