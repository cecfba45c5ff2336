//! Full corpus rebuild: dedupe, retention, selective re-embedding.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use docket_core::models::dedupe_key;
use docket_core::EmbeddingFunction;

use crate::corpus::{Corpus, StoredDocument};
use crate::ingest::embed_best_effort;
use crate::retention::purge_expired;

/// Outcome of a reindex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReindexReport {
    /// Documents in the rebuilt corpus.
    pub kept: usize,
    pub duplicates: usize,
    pub expired: usize,
    /// Vectors recomputed.
    pub reembedded: usize,
    /// Re-embeddings that failed; those documents keep their old vector.
    pub failed: usize,
}

/// Keep the first document per dedupe key, recomputing keys with the
/// current rules. Returns how many were dropped.
pub fn dedupe_in_place(documents: &mut Vec<StoredDocument>) -> usize {
    let before = documents.len();
    let mut seen = HashSet::new();
    documents.retain_mut(|doc| {
        doc.key = dedupe_key(&doc.text, &doc.metadata);
        seen.insert(doc.key.clone())
    });
    before - documents.len()
}

/// Rebuild `corpus` in place for `embedder`.
///
/// Every vector is recomputed when the corpus fingerprint names another
/// embedder; otherwise only vectors of the wrong dimensionality are. The
/// fingerprint is updated once no stale vectors remain.
pub fn rebuild(
    corpus: &mut Corpus,
    embedder: &dyn EmbeddingFunction,
    current_fingerprint: &str,
    now: DateTime<Utc>,
    ttl_days: Option<u32>,
) -> ReindexReport {
    let mut report = ReindexReport {
        duplicates: dedupe_in_place(&mut corpus.documents),
        expired: purge_expired(&mut corpus.documents, now, ttl_days),
        ..ReindexReport::default()
    };

    let stale_corpus = corpus.is_stale_for(current_fingerprint);
    let dims = embedder.dimensions();
    let targets: Vec<usize> = corpus
        .documents
        .iter()
        .enumerate()
        .filter(|(_, doc)| stale_corpus || doc.vector.len() != dims)
        .map(|(i, _)| i)
        .collect();

    if !targets.is_empty() {
        let keys: Vec<&str> = targets.iter().map(|&i| corpus.documents[i].key.as_str()).collect();
        let texts: Vec<String> = targets.iter().map(|&i| corpus.documents[i].text.clone()).collect();
        let vectors = embed_best_effort(embedder, &keys, &texts);
        for (i, vector) in targets.into_iter().zip(vectors) {
            match vector {
                Some(vector) => {
                    corpus.documents[i].vector = vector;
                    report.reembedded += 1;
                }
                None => report.failed += 1,
            }
        }
    }

    if report.failed == 0 {
        corpus.fingerprint = Some(current_fingerprint.to_string());
    }
    report.kept = corpus.documents.len();
    report
}

#[cfg(test)]
mod tests {
    use docket_core::errors::EmbeddingResult;
    use docket_core::Metadata;

    use super::*;

    struct Unit;

    impl EmbeddingFunction for Unit {
        fn embed_documents(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.0, 1.0]).collect())
        }
        fn embed_query(&self, _text: &str) -> EmbeddingResult<Vec<f32>> {
            Ok(vec![0.0, 1.0])
        }
        fn dimensions(&self) -> usize {
            2
        }
        fn name(&self) -> &str {
            "unit"
        }
    }

    fn doc(text: &str, vector: Vec<f32>) -> StoredDocument {
        StoredDocument::new(text.into(), Metadata::new(), vector)
    }

    #[test]
    fn first_duplicate_wins() {
        let mut docs = vec![doc("a", vec![1.0, 0.0]), doc("a", vec![0.0, 1.0]), doc("b", vec![1.0, 0.0])];
        assert_eq!(dedupe_in_place(&mut docs), 1);
        assert_eq!(docs[0].vector, vec![1.0, 0.0]);
    }

    #[test]
    fn only_wrong_dimension_vectors_are_recomputed() {
        let mut corpus = Corpus::new(vec![doc("a", vec![1.0, 0.0]), doc("b", vec![])], Some("unit:2".into()));
        let report = rebuild(&mut corpus, &Unit, "unit:2", Utc::now(), None);
        assert_eq!(report.reembedded, 1);
        assert_eq!(corpus.documents[0].vector, vec![1.0, 0.0]);
        assert_eq!(corpus.documents[1].vector, vec![0.0, 1.0]);
    }

    #[test]
    fn foreign_fingerprint_recomputes_everything() {
        let mut corpus = Corpus::new(vec![doc("a", vec![1.0, 0.0])], Some("other:2".into()));
        let report = rebuild(&mut corpus, &Unit, "unit:2", Utc::now(), None);
        assert_eq!(report.reembedded, 1);
        assert_eq!(corpus.fingerprint.as_deref(), Some("unit:2"));
        assert_eq!(corpus.documents[0].vector, vec![0.0, 1.0]);
    }
}
