//! Insert planning and best-effort embedding.

use std::collections::HashSet;

use docket_core::logging::events;
use docket_core::traits::l2_normalize;
use docket_core::{Document, EmbeddingFunction};

use crate::corpus::StoredDocument;

/// Documents that survived skip and dedupe filtering, in input order.
#[derive(Debug, Default)]
pub struct InsertPlan {
    pub fresh: Vec<(String, Document)>,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Drop skipped documents, then every document whose dedupe key is in
/// `existing` or appeared earlier in `documents`. Runs before any embedding.
pub fn plan_insert(existing: &HashSet<&str>, documents: Vec<Document>) -> InsertPlan {
    let mut plan = InsertPlan::default();
    let mut seen: HashSet<String> = HashSet::new();
    for doc in documents {
        if !doc.should_ingest() {
            plan.skipped += 1;
            continue;
        }
        let key = doc.dedupe_key();
        if existing.contains(key.as_str()) || !seen.insert(key.clone()) {
            plan.duplicates += 1;
            continue;
        }
        plan.fresh.push((key, doc));
    }
    plan
}

/// Embed `texts`, one slot per input. `None` marks an item that failed.
///
/// The whole batch is tried first. If the provider rejects it, each text
/// is retried alone so one bad input cannot sink the rest. Vectors of the
/// wrong dimensionality count as failures. Survivors are L2-normalized.
pub fn embed_best_effort(
    embedder: &dyn EmbeddingFunction,
    keys: &[&str],
    texts: &[String],
) -> Vec<Option<Vec<f32>>> {
    if texts.is_empty() {
        return Vec::new();
    }

    let raw: Vec<Option<Vec<f32>>> = match embedder.embed_documents(texts) {
        Ok(vectors) if vectors.len() == texts.len() => vectors.into_iter().map(Some).collect(),
        outcome => {
            let reason = match outcome {
                Ok(vectors) => format!("batch returned {} vectors for {} texts", vectors.len(), texts.len()),
                Err(e) => e.to_string(),
            };
            tracing::warn!(
                provider = embedder.name(),
                batch = texts.len(),
                reason = %reason,
                "batch embedding failed, retrying per item"
            );
            texts
                .iter()
                .zip(keys)
                .map(|(text, key)| match embedder.embed_document(text) {
                    Ok(vector) => Some(vector),
                    Err(e) => {
                        events::embedding_failed(key, &e.to_string());
                        None
                    }
                })
                .collect()
        }
    };

    let dims = embedder.dimensions();
    raw.into_iter()
        .zip(keys)
        .map(|(slot, key)| {
            let mut vector = slot?;
            if vector.len() != dims {
                events::embedding_failed(
                    key,
                    &format!("expected {dims} dimensions, got {}", vector.len()),
                );
                return None;
            }
            l2_normalize(&mut vector);
            Some(vector)
        })
        .collect()
}

/// Embed a planned insert. Returns the stored records and the failure count.
pub fn embed_plan(embedder: &dyn EmbeddingFunction, plan: InsertPlan) -> (Vec<StoredDocument>, usize) {
    let keys: Vec<&str> = plan.fresh.iter().map(|(k, _)| k.as_str()).collect();
    let texts: Vec<String> = plan.fresh.iter().map(|(_, d)| d.text.clone()).collect();
    let vectors = embed_best_effort(embedder, &keys, &texts);

    let mut stored = Vec::with_capacity(vectors.len());
    let mut failed = 0;
    for ((key, doc), vector) in plan.fresh.into_iter().zip(vectors) {
        match vector {
            Some(vector) => stored.push(StoredDocument {
                key,
                text: doc.text,
                metadata: doc.metadata,
                vector,
            }),
            None => failed += 1,
        }
    }
    (stored, failed)
}
