pub mod embedding;
pub mod gap;

pub use embedding::{l2_normalize, EmbeddingFunction};
pub use gap::GapEstimator;
