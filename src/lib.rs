//! # workpool
//!
//! Two in-process primitives for running caller-supplied work off the
//! calling thread:
//!
//! - **[`WorkerPool`]**: a resizable pool of worker threads draining one
//!   shared FIFO queue, with caller-driven resize and a coordinated
//!   drain-and-join shutdown.
//! - **[`SerialExecutor`]**: a single dedicated thread draining its own
//!   queue strictly in submission order, with a graceful drain-then-stop or
//!   an immediate terminate that hands the unstarted jobs back.
//!
//! Both are fire-and-forget: no futures, no per-job results, no priorities,
//! no cancellation of a job once it starts. Dispatch errors are limited to
//! API misuse (dispatching to a stopping executor); errors *inside* a job
//! are logged by the consuming thread and never transformed, and a panic
//! inside a job kills its thread without supervision.
//!
//! ## Pool quick start
//!
//! ```rust
//! use workpool::prelude::*;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::new(4)?;
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! for _ in 0..10 {
//!     let counter = Arc::clone(&counter);
//!     pool.dispatch(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     });
//! }
//!
//! // Grow and shrink at runtime; decrement retires whichever idle worker
//! // picks up the sentinel, not a specific thread.
//! pool.increment(2)?;
//! pool.decrement(3);
//!
//! // Terminal: drains queued work, then joins every worker.
//! pool.join()?;
//! assert_eq!(counter.load(Ordering::SeqCst), 10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Serial executor quick start
//!
//! ```rust
//! use workpool::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! # fn main() -> Result<()> {
//! let executor = SerialExecutor::new()?;
//!
//! let order = Arc::new(Mutex::new(Vec::new()));
//! for i in 1..=5 {
//!     let order = Arc::clone(&order);
//!     executor.dispatch(move || {
//!         order.lock().unwrap().push(i);
//!         Ok(())
//!     })?;
//! }
//!
//! executor.join()?;
//! assert_eq!(*order.lock().unwrap(), vec![1, 2, 3, 4, 5]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Jobs with arguments
//!
//! Positional arguments are captured into the job at dispatch time; the
//! older polymorphic callable-or-array payload shape is not supported.
//!
//! ```rust
//! use workpool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::new(1)?;
//! pool.dispatch_with(|(a, b)| {
//!     println!("{} + {} = {}", a, b, a + b);
//!     Ok(())
//! }, (2, 3));
//! pool.join()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod executor;
pub mod pool;
pub mod prelude;
pub mod queue;

pub use self::core::{BoxedJob, ClosureJob, Job, PoolError, Result};
pub use self::executor::SerialExecutor;
pub use self::pool::{WorkerId, WorkerPool};
pub use self::queue::BlockingQueue;
