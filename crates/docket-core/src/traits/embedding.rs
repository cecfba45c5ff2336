use std::sync::Arc;

use crate::errors::{EmbeddingError, EmbeddingResult};

/// Deterministic text→vector mapping.
///
/// Implementations must return the same vector for the same text across
/// process restarts, because stored vectors are never recomputed unless
/// the store is reindexed.
pub trait EmbeddingFunction: Send + Sync {
    /// Embed a batch of documents, one vector per text, in order.
    fn embed_documents(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Embed a search query.
    fn embed_query(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// Embed a single document. Used when a batch fails and items are
    /// retried one by one.
    fn embed_document(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let mut batch = self.embed_documents(&[text.to_string()])?;
        if batch.len() != 1 {
            return Err(EmbeddingError::BatchSizeMismatch {
                expected: 1,
                actual: batch.len(),
            });
        }
        Ok(batch.remove(0))
    }

    /// The dimensionality of vectors produced by this function.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}

impl<E: EmbeddingFunction + ?Sized> EmbeddingFunction for Box<E> {
    fn embed_documents(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        (**self).embed_documents(texts)
    }

    fn embed_query(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        (**self).embed_query(text)
    }

    fn embed_document(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        (**self).embed_document(text)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<E: EmbeddingFunction + ?Sized> EmbeddingFunction for Arc<E> {
    fn embed_documents(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        (**self).embed_documents(texts)
    }

    fn embed_query(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        (**self).embed_query(text)
    }

    fn embed_document(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        (**self).embed_document(text)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Scale a vector to unit length in place. Zero vectors are left as-is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
