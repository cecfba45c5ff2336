//! L1 in-memory embedding cache using moka.
//!
//! Keys are blake3 content hashes of the text, prefixed so query and
//! document embeddings of the same text never collide.

use std::time::Duration;

use moka::sync::Cache;

use docket_core::errors::{EmbeddingError, EmbeddingResult};
use docket_core::models::content_hash;
use docket_core::traits::EmbeddingFunction;

const QUERY_PREFIX: &str = "q:";
const DOCUMENT_PREFIX: &str = "d:";

/// Wraps any embedder with a bounded, idle-expiring cache.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Cache<String, Vec<f32>>,
}

impl<E: EmbeddingFunction> CachedEmbedder<E> {
    /// Create a cache holding at most `max_entries` vectors.
    pub fn new(inner: E, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(3600))
            .build();
        Self { inner, cache }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Number of cached vectors. Eventually consistent.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    fn key(prefix: &str, text: &str) -> String {
        format!("{prefix}{}", content_hash(text))
    }
}

impl<E: EmbeddingFunction> EmbeddingFunction for CachedEmbedder<E> {
    fn embed_documents(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let keys: Vec<String> = texts.iter().map(|t| Self::key(DOCUMENT_PREFIX, t)).collect();
        let mut out: Vec<Option<Vec<f32>>> = keys.iter().map(|k| self.cache.get(k)).collect();

        let missing: Vec<usize> = out
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(i, _)| i)
            .collect();

        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let fresh = self.inner.embed_documents(&batch)?;
            if fresh.len() != batch.len() {
                return Err(EmbeddingError::BatchSizeMismatch {
                    expected: batch.len(),
                    actual: fresh.len(),
                });
            }
            for (i, vector) in missing.into_iter().zip(fresh) {
                self.cache.insert(keys[i].clone(), vector.clone());
                out[i] = Some(vector);
            }
        }

        tracing::trace!(batch = texts.len(), provider = self.inner.name(), "cached embed batch");
        Ok(out.into_iter().flatten().collect())
    }

    fn embed_query(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let key = Self::key(QUERY_PREFIX, text);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let vector = self.inner.embed_query(text)?;
        self.cache.insert(key, vector.clone());
        Ok(vector)
    }

    fn embed_document(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let key = Self::key(DOCUMENT_PREFIX, text);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let vector = self.inner.embed_document(text)?;
        self.cache.insert(key, vector.clone());
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::HashEmbedder;

    struct Counting {
        inner: HashEmbedder,
        calls: AtomicUsize,
        texts: AtomicUsize,
    }

    impl EmbeddingFunction for Counting {
        fn embed_documents(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts.fetch_add(texts.len(), Ordering::SeqCst);
            self.inner.embed_documents(texts)
        }
        fn embed_query(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed_query(text)
        }
        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }
        fn name(&self) -> &str {
            "counting"
        }
    }

    fn counting() -> CachedEmbedder<Counting> {
        CachedEmbedder::new(
            Counting {
                inner: HashEmbedder::new(16),
                calls: AtomicUsize::new(0),
                texts: AtomicUsize::new(0),
            },
            100,
        )
    }

    #[test]
    fn repeated_query_hits_cache() {
        let e = counting();
        let a = e.embed_query("hello world").unwrap();
        let b = e.embed_query("hello world").unwrap();
        assert_eq!(a, b);
        assert_eq!(e.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn batch_only_embeds_misses_and_keeps_order() {
        let e = counting();
        e.embed_documents(&["a".to_string()]).unwrap();
        let texts = vec!["b".to_string(), "a".to_string(), "c".to_string()];
        let out = e.embed_documents(&texts).unwrap();

        assert_eq!(e.inner().texts.load(Ordering::SeqCst), 3);
        let direct = HashEmbedder::new(16).embed_documents(&texts).unwrap();
        assert_eq!(out, direct);
    }
}
