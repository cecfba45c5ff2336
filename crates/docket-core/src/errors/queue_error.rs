//! Work queue errors.

use super::LockError;

/// Errors surfaced by the adaptive work queue.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("corrupt queue state in {path}: {reason}")]
    CorruptState { path: String, reason: String },

    #[error("timed out after {waited_ms}ms waiting for queue lock {path}")]
    LockTimeout { path: String, waited_ms: u64 },

    #[error("failed to persist queue {path}: {message}")]
    Persistence { path: String, message: String },
}

impl From<LockError> for QueueError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Timeout { path, waited_ms } => Self::LockTimeout { path, waited_ms },
            LockError::Io { path, message } => Self::Persistence { path, message },
        }
    }
}

pub type QueueResult<T> = Result<T, QueueError>;
