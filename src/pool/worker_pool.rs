//! Resizable worker thread pool implementation

use crate::core::{ClosureJob, Job, Result, Task};
use crate::pool::worker::{self, Registry, WorkerId};
use crate::queue::BlockingQueue;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// A resizable pool of worker threads draining one shared FIFO queue.
///
/// Workers are spawned eagerly at construction and on [`increment`]; they
/// block on the queue when idle and run jobs to completion, with no backoff
/// and no batching. [`decrement`] shrinks *capacity*, not a specific worker:
/// it enqueues termination sentinels and whichever idle worker pops one
/// exits. [`join`] is terminal: the pool ends up with zero workers, and
/// jobs dispatched afterwards are enqueued but never consumed (a documented
/// caller contract, not a runtime error).
///
/// # Failure semantics
///
/// A job that returns `Err` is logged by the worker, which then continues.
/// A job that *panics* kills its worker thread and the pool's bookkeeping is
/// deliberately not reconciled: [`thread_count`] then overstates live
/// capacity, and [`join`] reports the panic when it joins the dead handle.
/// There is no supervision or restart.
///
/// # Example
///
/// ```rust
/// use workpool::prelude::*;
///
/// # fn main() -> Result<()> {
/// let pool = WorkerPool::new(4)?;
/// for i in 0..8 {
///     pool.dispatch(move || {
///         println!("job {} executing", i);
///         Ok(())
///     });
/// }
/// pool.join()?;
/// # Ok(())
/// # }
/// ```
///
/// [`increment`]: WorkerPool::increment
/// [`decrement`]: WorkerPool::decrement
/// [`join`]: WorkerPool::join
/// [`thread_count`]: WorkerPool::thread_count
pub struct WorkerPool {
    queue: Arc<BlockingQueue<Task>>,
    registry: Arc<Mutex<Registry>>,
    next_worker_id: AtomicUsize,
    debug_enabled: Arc<AtomicBool>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("thread_count", &self.thread_count())
            .field("queue_len", &self.queue.len())
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool and immediately spawn `num_threads` workers.
    ///
    /// `num_threads` may be zero: an empty pool is legal and can be grown
    /// later with [`increment`](WorkerPool::increment).
    pub fn new(num_threads: usize) -> Result<Self> {
        let pool = Self {
            queue: Arc::new(BlockingQueue::new()),
            registry: Arc::new(Mutex::new(Registry::default())),
            next_worker_id: AtomicUsize::new(0),
            debug_enabled: Arc::new(AtomicBool::new(false)),
        };
        pool.increment(num_threads)?;
        Ok(pool)
    }

    /// Dispatch a closure for asynchronous execution by some worker.
    ///
    /// Non-blocking; the queue is unbounded. No result is propagated back:
    /// completion of a specific job is not observable through the API, only
    /// aggregate completion via [`join`](WorkerPool::join).
    pub fn dispatch<F>(&self, f: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.submit(ClosureJob::new(f));
    }

    /// Dispatch a callable together with its positional arguments.
    ///
    /// The arguments are captured into the job at dispatch time and handed
    /// to `f` when some worker invokes it.
    pub fn dispatch_with<F, A>(&self, f: F, args: A)
    where
        F: FnOnce(A) -> Result<()> + Send + 'static,
        A: Send + 'static,
    {
        self.submit(ClosureJob::new(move || f(args)));
    }

    /// Dispatch a caller-defined [`Job`] value.
    pub fn submit<J: Job + 'static>(&self, job: J) {
        self.queue.push(Task::Run(Box::new(job)));
    }

    /// Add `num` workers to the pool.
    pub fn increment(&self, num: usize) -> Result<()> {
        for _ in 0..num {
            let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
            let handle = worker::spawn_worker(
                id,
                Arc::clone(&self.queue),
                Arc::clone(&self.registry),
                Arc::clone(&self.debug_enabled),
            )?;
            {
                let mut guard = self.registry.lock();
                guard.handles.insert(id, handle);
                guard.count += 1;
            }
            log::debug!("spawned worker {}", id);
            if self.debug_enabled.load(Ordering::Relaxed) {
                self.debug(&format!("spawned worker {}", id));
            }
        }
        Ok(())
    }

    /// Remove `num` workers from the pool, clamped to the current count.
    ///
    /// For each unit a termination sentinel is enqueued behind the work
    /// already queued; whichever idle worker pops a sentinel removes itself
    /// and exits. There is no targeting of specific threads. The capacity
    /// count drops immediately at enqueue time, ahead of the actual exits.
    pub fn decrement(&self, num: usize) {
        let num = {
            let mut guard = self.registry.lock();
            let num = num.min(guard.count);
            guard.count -= num;
            num
        };
        for _ in 0..num {
            log::debug!("dispatching termination sentinel");
            if self.debug_enabled.load(Ordering::Relaxed) {
                self.debug("dispatching termination sentinel");
            }
            self.queue.push(Task::Terminate);
        }
    }

    /// Terminate every current worker and block until all have exited.
    ///
    /// Already-queued jobs drain first: the sentinels line up behind them in
    /// the shared FIFO. After `join` returns the pool holds zero workers.
    ///
    /// # Errors
    ///
    /// Returns a join error if any worker thread had panicked; the
    /// remaining workers are still joined.
    pub fn join(&self) -> Result<()> {
        // Snapshot ownership of every handle before enqueueing sentinels,
        // or the workers' self-removal races the join loop.
        let (handles, count) = {
            let mut guard = self.registry.lock();
            let handles: Vec<(WorkerId, JoinHandle<()>)> = guard.handles.drain().collect();
            let count = guard.count;
            guard.count = 0;
            (handles, count)
        };
        for _ in 0..count {
            self.queue.push(Task::Terminate);
        }

        let mut first_panic: Option<WorkerId> = None;
        for (id, handle) in handles {
            if self.debug_enabled.load(Ordering::Relaxed) {
                self.debug(&format!("joining worker {}", id));
            }
            log::debug!("joining worker {}", id);
            if handle.join().is_err() && first_panic.is_none() {
                first_panic = Some(id);
            }
        }
        match first_panic {
            None => Ok(()),
            Some(id) => Err(crate::core::PoolError::join(
                format!("worker-{}", id),
                "worker thread panicked",
            )),
        }
    }

    /// Diagnostic print to stdout, serialized by the pool guard so output
    /// does not interleave mid-line with lifecycle changes.
    pub fn debug(&self, msg: &str) {
        let _guard = self.registry.lock();
        println!("{}", msg);
    }

    /// Enable or disable diagnostic printing of lifecycle events.
    pub fn set_debug(&self, enabled: bool) {
        self.debug_enabled.store(enabled, Ordering::Relaxed);
    }

    /// The current worker capacity.
    ///
    /// Transiently overstated between a sentinel enqueue and the targeted
    /// exit, and after a worker dies to a panicking job.
    pub fn thread_count(&self) -> usize {
        self.registry.lock().count
    }

    /// Ids of the currently registered workers, in ascending order.
    pub fn worker_ids(&self) -> Vec<WorkerId> {
        let mut ids: Vec<WorkerId> = self.registry.lock().handles.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of jobs currently queued (approximate, diagnostics only).
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}
