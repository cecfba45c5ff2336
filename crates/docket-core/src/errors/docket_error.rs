//! Top-level error aggregating every subsystem via `From` conversions.

use super::{ConfigError, EmbeddingError, LockError, QueueError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum DocketError {
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type DocketResult<T> = Result<T, DocketError>;
