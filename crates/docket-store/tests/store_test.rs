//! End-to-end behaviour of the retrieval store over both backends.

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use docket_core::config::{BackendKind, StoreConfig};
use docket_core::errors::{EmbeddingError, EmbeddingResult, StoreError};
use docket_core::{Document, EmbeddingFunction, Metadata, MetadataFilter};
use docket_embeddings::HashEmbedder;
use docket_store::RetrievalStore;

const BACKENDS: [BackendKind; 2] = [BackendKind::Sqlite, BackendKind::File];

fn meta(value: serde_json::Value) -> Metadata {
    serde_json::from_value(value).unwrap()
}

fn doc(text: &str, metadata: serde_json::Value) -> Document {
    Document::new(text, meta(metadata))
}

fn config(dir: &Path, backend: BackendKind) -> StoreConfig {
    docket_core::logging::init_tracing_with_filter("docket=debug");
    let mut config = StoreConfig::at(dir.join("corpus.sqlite")).with_backend(backend);
    config.lock_poll_interval_ms = 1;
    config
}

fn open(dir: &Path, backend: BackendKind) -> RetrievalStore {
    RetrievalStore::open(config(dir, backend), Arc::new(HashEmbedder::new(64))).unwrap()
}

/// Rejects any text containing "poison", failing the whole batch with it.
struct Picky(HashEmbedder);

impl EmbeddingFunction for Picky {
    fn embed_documents(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.iter().any(|t| t.contains("poison")) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "poisoned input".to_string(),
            });
        }
        self.0.embed_documents(texts)
    }

    fn embed_query(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.0.embed_query(text)
    }

    fn dimensions(&self) -> usize {
        self.0.dimensions()
    }

    fn name(&self) -> &str {
        "picky"
    }
}

#[test]
fn adding_the_same_document_repeatedly_keeps_one() {
    for backend in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path(), backend);
        for _ in 0..4 {
            store
                .add(vec![doc("statute text", json!({"url": "https://example.test/a"}))])
                .unwrap();
        }
        assert_eq!(store.len(), 1, "{backend}");
    }
}

#[test]
fn add_report_accounts_for_every_input() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), BackendKind::File);
    store.add(vec![doc("already here", json!({}))]).unwrap();

    let report = store
        .add(vec![
            doc("already here", json!({})),
            doc("fresh", json!({"url": "u1"})),
            doc("fresh copy", json!({"url": "u1"})),
            doc("opted out", json!({"skip": true})),
            doc("kept", json!({"skip": false})),
        ])
        .unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.duplicates, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.total(), 5);
    assert_eq!(store.len(), 3);
}

#[test]
fn skipped_document_does_not_claim_its_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), BackendKind::File);
    let report = store
        .add(vec![
            doc("draft", json!({"url": "u", "skip": true})),
            doc("final", json!({"url": "u"})),
        ])
        .unwrap();
    assert_eq!((report.added, report.skipped, report.duplicates), (1, 1, 0));
    assert_eq!(store.list_documents()[0].text, "final");
}

#[test]
fn add_texts_rejects_mismatched_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), BackendKind::File);
    let err = store.add_texts(&["a", "b"], Some(&[Metadata::new()])).unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput { .. }));

    let report = store.add_texts(&["a", "b"], None).unwrap();
    assert_eq!(report.added, 2);
}

#[test]
fn filtered_search_never_crosses_regions() {
    for backend in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path(), backend);
        store
            .add(vec![
                doc("zoning permit rules for region alpha", json!({"region": "A"})),
                doc("zoning permit rules for region beta", json!({"region": "B"})),
                doc("tax filing calendar", json!({"region": "A"})),
                doc("zoning permit rules", json!({"region": ["B", "C"]})),
            ])
            .unwrap();

        let filter = MetadataFilter::new().with("region", "A");
        let hits = store.search("zoning permit rules", 10, Some(&filter)).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.document.metadata["region"].as_str() == Some("A")));

        let filter = MetadataFilter::new().with("region", "B");
        let hits = store.search("zoning permit rules", 10, Some(&filter)).unwrap();
        assert_eq!(hits.len(), 2, "list membership matches too");
    }
}

#[test]
fn search_ranks_closest_first_and_honours_k() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), BackendKind::Sqlite);
    store
        .add_texts(&["river flood insurance", "minimum wage ordinance", "flood plain maps"], None)
        .unwrap();

    let hits = store.search("minimum wage ordinance", 2, None).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].document.text, "minimum wage ordinance");
    assert!(hits[0].score >= hits[1].score);
    assert!((hits[0].score - 1.0).abs() < 1e-4);
}

#[test]
fn search_edge_cases_return_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), BackendKind::File);
    assert!(store.search("anything", 5, None).unwrap().is_empty());

    store.add_texts(&["something"], None).unwrap();
    assert!(store.search("something", 0, None).unwrap().is_empty());

    let filter = MetadataFilter::new().with("region", "nowhere");
    assert!(store.search("something", 5, Some(&filter)).unwrap().is_empty());
}

#[test]
fn reindex_applies_retention_and_keeps_undated_documents() {
    for backend in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        let store = RetrievalStore::open(
            config(dir.path(), backend).with_retention_days(Some(1)),
            Arc::new(HashEmbedder::new(64)),
        )
        .unwrap();
        store
            .add(vec![
                doc("old", json!({"ingested_at": (now - Duration::days(2)).to_rfc3339()})),
                doc("new", json!({"ingested_at": now.to_rfc3339()})),
                doc("undated", json!({})),
            ])
            .unwrap();

        let report = store.reindex_at(now).unwrap();
        assert_eq!(report.expired, 1);
        assert_eq!(report.kept, 2);
        assert_eq!(report.reembedded, 0);

        let texts: Vec<String> = store.list_documents().into_iter().map(|d| d.text).collect();
        assert_eq!(texts, vec!["new", "undated"], "{backend}");
    }
}

#[test]
fn retention_purge_is_disabled_by_none_or_zero() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc::now();
    let store = open(dir.path(), BackendKind::File);
    store
        .add(vec![doc("ancient", json!({"ingested_at": "2001-01-01"}))])
        .unwrap();

    assert_eq!(store.retention_purge(now, None).unwrap(), 0);
    assert_eq!(store.retention_purge(now, Some(0)).unwrap(), 0);
    assert_eq!(store.retention_purge(now, Some(30)).unwrap(), 1);
    assert!(store.is_empty());
}

#[test]
fn oversized_ttl_keeps_everything() {
    let dir = tempfile::tempdir().unwrap();
    let store = RetrievalStore::open(
        config(dir.path(), BackendKind::File).with_retention_days(Some(u32::MAX)),
        Arc::new(HashEmbedder::new(64)),
    )
    .unwrap();
    store
        .add(vec![doc("ancient", json!({"ingested_at": "2001-01-01"}))])
        .unwrap();

    assert_eq!(store.retention_purge(Utc::now(), Some(u32::MAX)).unwrap(), 0);
    assert_eq!(store.apply_retention().unwrap(), 0);
    assert_eq!(store.reindex().unwrap().expired, 0);
    assert_eq!(store.len(), 1);
}

#[test]
fn failing_item_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let store = RetrievalStore::open(
        config(dir.path(), BackendKind::File),
        Arc::new(Picky(HashEmbedder::new(32))),
    )
    .unwrap();

    let report = store
        .add_texts(&["clean one", "poison pill", "clean two"], None)
        .unwrap();
    assert_eq!(report.added, 2);
    assert_eq!(report.failed, 1);

    let texts: Vec<String> = store.list_documents().into_iter().map(|d| d.text).collect();
    assert_eq!(texts, vec!["clean one", "clean two"]);
}

#[test]
fn corpus_survives_reopen() {
    for backend in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open(dir.path(), backend);
            store
                .add(vec![
                    doc("first", json!({"url": "u1", "tags": ["x", "y"]})),
                    doc("second", json!({"n": 3, "score": 0.5, "published_at": null})),
                ])
                .unwrap();
        }

        let reopened = open(dir.path(), backend);
        assert_eq!(reopened.backend_name(), backend.as_str());
        let docs = reopened.list_documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], doc("first", json!({"url": "u1", "tags": ["x", "y"]})));
        assert_eq!(docs[1].metadata, meta(json!({"n": 3, "score": 0.5, "published_at": null})));

        let hits = reopened.search("second", 1, None).unwrap();
        assert_eq!(hits[0].document.text, "second");
    }
}

#[test]
fn new_embedder_vectors_are_rebuilt_on_reindex() {
    for backend in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open(dir.path(), backend);
            store.add_texts(&["alpha beta", "gamma delta"], None).unwrap();
            assert_eq!(store.stats().fingerprint.as_deref(), Some("hash:64"));
        }

        let store = RetrievalStore::open(config(dir.path(), backend), Arc::new(HashEmbedder::new(16)))
            .unwrap();
        assert!(
            store.search("alpha beta", 5, None).unwrap().is_empty(),
            "vectors of another size are never scored"
        );

        let report = store.reindex().unwrap();
        assert_eq!(report.reembedded, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(store.stats().fingerprint.as_deref(), Some("hash:16"));
        assert_eq!(store.search("alpha beta", 1, None).unwrap()[0].document.text, "alpha beta");

        let again = store.reindex().unwrap();
        assert_eq!(again.reembedded, 0, "{backend}: vectors stay stable");
    }
}

#[test]
fn deletion_by_tag_index_and_predicate() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), BackendKind::Sqlite);
    store
        .add(vec![
            doc("a", json!({"jurisdiction_tags": ["us-ca", "us"]})),
            doc("b", json!({"jurisdiction_tags": ["us-ny"]})),
            doc("c", json!({"jurisdiction_tags": "us-ca"})),
            doc("d", json!({})),
            doc("e", json!({"jurisdiction_tags": ["us-ca"], "draft": true})),
        ])
        .unwrap();

    assert_eq!(store.purge_to_tag("us-ca").unwrap(), 2);
    let texts: Vec<String> = store.list_documents().into_iter().map(|d| d.text).collect();
    assert_eq!(texts, vec!["a", "c", "e"]);

    assert_eq!(store.delete_indices(&[1, 7]).unwrap(), 1);
    assert_eq!(store.list_documents()[1].text, "e");

    let removed = store
        .delete_by_predicate(|m| !m.get("draft").is_some_and(|v| v.is_truthy()))
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.len(), 1);

    assert_eq!(store.delete_indices(&[]).unwrap(), 0);
}

#[test]
fn stats_report_backend_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), BackendKind::File);
    store.add_texts(&["words", "   "], None).unwrap();

    let stats = store.stats();
    assert_eq!(stats.stored, 2);
    assert_eq!(stats.non_empty, 1);
    assert_eq!(stats.dimensions, 64);
    assert_eq!(stats.backend, "file");
}

#[test]
fn auto_falls_back_to_the_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), BackendKind::Auto);
    // A directory where the database should be makes SQLite unusable.
    std::fs::create_dir_all(&config.path).unwrap();

    let store = RetrievalStore::open(config.clone(), Arc::new(HashEmbedder::new(32))).unwrap();
    assert_eq!(store.backend_name(), "file");
    store.add_texts(&["persisted as json"], None).unwrap();
    assert!(config.file_path().exists());
}

#[test]
fn auto_prefers_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path(), BackendKind::Auto);
    assert_eq!(store.backend_name(), "sqlite");
}

#[test]
fn refresh_picks_up_writes_from_other_handles() {
    let dir = tempfile::tempdir().unwrap();
    let reader = open(dir.path(), BackendKind::Sqlite);
    let writer = open(dir.path(), BackendKind::Sqlite);

    writer.add_texts(&["from elsewhere"], None).unwrap();
    assert!(reader.is_empty());
    reader.refresh().unwrap();
    assert_eq!(reader.len(), 1);
}

#[test]
fn writers_merge_with_what_others_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let first = open(dir.path(), BackendKind::File);
    let second = open(dir.path(), BackendKind::File);

    first.add_texts(&["one"], None).unwrap();
    let report = second.add_texts(&["one", "two"], None).unwrap();
    assert_eq!((report.added, report.duplicates), (1, 1));
    assert_eq!(second.len(), 2);
}
