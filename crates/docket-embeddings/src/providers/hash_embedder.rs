//! Token-hashing embedding provider.
//!
//! Each whitespace-separated token is hashed with blake3 into one of
//! `dimensions` buckets; bucket counts are L2-normalized. No model, no
//! network, and the same text always maps to the same vector.

use rayon::prelude::*;

use docket_core::errors::EmbeddingResult;
use docket_core::traits::{l2_normalize, EmbeddingFunction};

/// Batches at or above this size are embedded on the rayon pool.
const PARALLEL_BATCH_THRESHOLD: usize = 64;

/// Deterministic bag-of-tokens embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Bucket index for a token: first 8 bytes of its blake3 digest, little endian.
    fn bucket(token: &str, dims: usize) -> usize {
        let digest = blake3::hash(token.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        (u64::from_le_bytes(head) % dims as u64) as usize
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vec;
        }
        for token in text.split_whitespace() {
            vec[Self::bucket(token, self.dimensions)] += 1.0;
        }
        l2_normalize(&mut vec);
        vec
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(docket_core::config::defaults::DEFAULT_EMBEDDING_DIMENSIONS)
    }
}

impl EmbeddingFunction for HashEmbedder {
    fn embed_documents(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.len() >= PARALLEL_BATCH_THRESHOLD {
            Ok(texts.par_iter().map(|t| self.embed_text(t)).collect())
        } else {
            Ok(texts.iter().map(|t| self.embed_text(t)).collect())
        }
    }

    fn embed_query(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn embed_document(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }
}
