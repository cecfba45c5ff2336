/// Embedding subsystem errors.
///
/// Raised per item. Batch ingestion in the retrieval store recovers from
/// these locally; only query embedding surfaces them to the caller.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("provider unavailable: {provider}")]
    ProviderUnavailable { provider: String },

    #[error("provider returned {actual} vectors for a batch of {expected}")]
    BatchSizeMismatch { expected: usize, actual: usize },
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;
