//! Convenient re-exports for common types and traits

pub use crate::core::{BoxedJob, ClosureJob, Job, PoolError, Result};
pub use crate::executor::SerialExecutor;
pub use crate::pool::{WorkerId, WorkerPool};
pub use crate::queue::BlockingQueue;
