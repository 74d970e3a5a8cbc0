//! Error types for the pool primitives

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the pool primitives
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Executor is draining after a stop request; no new work is accepted
    #[error("executor is stopping ({pending_jobs} jobs still queued)")]
    Stopping {
        /// Number of jobs still queued, including the termination sentinel
        pending_jobs: usize,
    },

    /// Executor consumer thread is already running
    #[error("executor is already running")]
    AlreadyRunning,

    /// Executor consumer thread is not running
    #[error("executor is not running")]
    NotRunning,

    /// Failed to spawn a thread
    #[error("failed to spawn thread '{name}': {source}")]
    Spawn {
        /// Name of the thread that failed to spawn
        name: String,
        /// Source IO error
        #[source]
        source: std::io::Error,
    },

    /// Failed to join a thread
    #[error("failed to join thread '{name}': {message}")]
    Join {
        /// Name of the thread that failed to join
        name: String,
        /// Error message
        message: String,
    },

    /// General error
    #[error("{0}")]
    Other(String),
}

impl PoolError {
    /// Create a stopping error
    pub fn stopping(pending_jobs: usize) -> Self {
        PoolError::Stopping { pending_jobs }
    }

    /// Create a spawn error
    pub fn spawn(name: impl Into<String>, source: std::io::Error) -> Self {
        PoolError::Spawn {
            name: name.into(),
            source,
        }
    }

    /// Create a join error
    pub fn join(name: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::Join {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PoolError::Other(msg.into())
    }
}
