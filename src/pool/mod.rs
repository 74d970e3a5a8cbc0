//! Worker pool and worker implementations

mod worker;
mod worker_pool;

pub use worker::WorkerId;
pub use worker_pool::WorkerPool;
