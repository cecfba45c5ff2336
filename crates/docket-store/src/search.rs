//! Brute-force filtered similarity search.

use serde::Serialize;

use docket_core::{Document, MetadataFilter};

use crate::corpus::StoredDocument;

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub document: Document,
    /// Dot product of the normalized query and document vectors.
    pub score: f32,
}

/// Score every document against a normalized `query`, keep those matching
/// `filter`, and return the best `k` by score. Equal scores keep insertion
/// order. Documents whose vector length differs from the query's are
/// skipped rather than scored.
pub fn rank(
    documents: &[StoredDocument],
    query: &[f32],
    k: usize,
    filter: Option<&MetadataFilter>,
) -> Vec<SearchHit> {
    if k == 0 || documents.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f32)> = documents
        .iter()
        .enumerate()
        .filter(|(_, doc)| doc.vector.len() == query.len())
        .filter(|(_, doc)| filter.map_or(true, |f| f.matches(&doc.metadata)))
        .map(|(i, doc)| (i, dot(query, &doc.vector)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(k);

    scored
        .into_iter()
        .map(|(i, score)| SearchHit {
            document: documents[i].to_document(),
            score,
        })
        .collect()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
