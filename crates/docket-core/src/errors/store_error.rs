//! Retrieval store errors.

use super::{EmbeddingError, LockError};

/// Errors surfaced by the retrieval store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("corrupt corpus in {path}: {reason}")]
    CorruptState { path: String, reason: String },

    #[error("timed out after {waited_ms}ms waiting for store lock {path}")]
    LockTimeout { path: String, waited_ms: u64 },

    #[error("failed to persist corpus {path}: {message}")]
    Persistence { path: String, message: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("{backend} backend error: {message}")]
    Backend { backend: String, message: String },

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

impl From<LockError> for StoreError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Timeout { path, waited_ms } => Self::LockTimeout { path, waited_ms },
            LockError::Io { path, message } => Self::Persistence { path, message },
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
