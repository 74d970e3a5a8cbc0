//! Worker thread loop and registry bookkeeping

use crate::core::{PoolError, Result, Task};
use crate::queue::BlockingQueue;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Stable identity of a worker thread within its pool
pub type WorkerId = usize;

/// Worker bookkeeping shared between the pool and its workers.
///
/// `count` tracks dispatched capacity and is debited at sentinel-enqueue
/// time, before the worker that eventually consumes the sentinel removes its
/// handle. With no resize in flight, `count == handles.len()`.
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) handles: HashMap<WorkerId, JoinHandle<()>>,
    pub(crate) count: usize,
}

/// Spawn a worker thread draining `queue` until it pops a termination
/// sentinel. The caller registers the returned handle; the worker removes
/// its own entry, by id, when it exits.
pub(crate) fn spawn_worker(
    id: WorkerId,
    queue: Arc<BlockingQueue<Task>>,
    registry: Arc<Mutex<Registry>>,
    debug_enabled: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    let name = format!("worker-{}", id);
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || run(id, queue, registry, debug_enabled))
        .map_err(|e| PoolError::spawn(name, e))
}

/// Main worker loop.
///
/// A job that returns `Err` is logged and the worker continues. A job that
/// panics unwinds through this loop and kills the worker thread without
/// touching the registry; the pool then overstates its capacity. See the
/// failure-semantics notes on [`WorkerPool`](crate::pool::WorkerPool).
fn run(
    id: WorkerId,
    queue: Arc<BlockingQueue<Task>>,
    registry: Arc<Mutex<Registry>>,
    debug_enabled: Arc<AtomicBool>,
) {
    log::trace!("worker {} started", id);
    loop {
        match queue.pop() {
            Task::Run(job) => {
                if let Err(e) = job.execute() {
                    log::error!("worker {}: job failed: {}", id, e);
                }
            }
            Task::Terminate => {
                let mut guard = registry.lock();
                guard.handles.remove(&id);
                if debug_enabled.load(Ordering::Relaxed) {
                    // Printed while holding the guard, same as WorkerPool::debug.
                    println!("removing worker {}", id);
                }
                log::debug!("worker {} exiting after termination sentinel", id);
                break;
            }
        }
    }
}
