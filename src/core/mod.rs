//! Core types and traits shared by the pool and the executor

pub mod error;
pub mod job;

pub use error::{PoolError, Result};
pub use job::{BoxedJob, ClosureJob, Job};

pub(crate) use job::Task;
