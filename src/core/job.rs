//! Job trait and related types

use crate::core::error::Result;
use std::fmt;

/// A trait representing a unit of work consumed exactly once by one thread.
///
/// `execute` takes the job by value: a job either runs fully on whichever
/// thread pops it, or is discarded unexecuted by a queue drain.
pub trait Job: Send {
    /// Execute the job
    ///
    /// # Errors
    ///
    /// Returns an error if the job execution fails. Errors are logged by the
    /// consuming thread and never propagated back to the dispatcher.
    fn execute(self: Box<Self>) -> Result<()>;

    /// Get the job's type name for debugging and logging
    fn job_type(&self) -> &str {
        "Job"
    }
}

impl fmt::Debug for dyn Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({})", self.job_type())
    }
}

/// A boxed job that can be sent across threads
pub type BoxedJob = Box<dyn Job>;

impl Job for BoxedJob {
    fn execute(self: Box<Self>) -> Result<()> {
        <dyn Job as Job>::execute(*self)
    }

    fn job_type(&self) -> &str {
        (**self).job_type()
    }
}

/// Helper to create a job from a closure
pub struct ClosureJob<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    closure: F,
    name: String,
}

impl<F> ClosureJob<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    /// Create a new closure job
    pub fn new(closure: F) -> Self {
        Self {
            closure,
            name: "ClosureJob".to_string(),
        }
    }

    /// Create a new closure job with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure,
            name: name.into(),
        }
    }
}

impl<F> Job for ClosureJob<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    fn execute(self: Box<Self>) -> Result<()> {
        (self.closure)()
    }

    fn job_type(&self) -> &str {
        &self.name
    }
}

/// The element exchanged through the queues of both primitives.
///
/// Termination is an explicit variant interpreted by the consumer loop, not
/// a closure reaching back into shared pool state. `Terminate` is never
/// constructible by callers.
#[derive(Debug)]
pub(crate) enum Task {
    /// Caller-supplied work
    Run(BoxedJob),
    /// Sentinel instructing the consuming thread to exit its loop
    Terminate,
}
