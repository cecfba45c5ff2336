//! The retrieval store facade.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use docket_core::config::StoreConfig;
use docket_core::constants::JURISDICTION_TAGS_KEY;
use docket_core::errors::{StoreError, StoreResult};
use docket_core::logging::events;
use docket_core::traits::l2_normalize;
use docket_core::{Document, EmbeddingFunction, FileLock, Metadata, MetadataFilter};

use crate::backend::{open_backend, CorpusBackend};
use crate::corpus::{fingerprint, Corpus};
use crate::ingest::{embed_plan, plan_insert};
use crate::reindex::{rebuild, ReindexReport};
use crate::report::{AddReport, StoreStats};
use crate::retention::purge_expired;
use crate::search::{rank, SearchHit};

/// A persistent, deduplicating corpus with similarity search.
///
/// Every mutation holds the exclusive lock next to the backend file for
/// its whole read-modify-write, embedding included, and reloads the
/// persisted corpus first, so concurrent writers in other processes are
/// never lost. Searches run against the in-memory copy refreshed by the
/// last mutation or [`refresh`](Self::refresh) made through this handle.
pub struct RetrievalStore {
    config: StoreConfig,
    backend: Box<dyn CorpusBackend>,
    embedder: Arc<dyn EmbeddingFunction>,
    fingerprint: String,
    lock: FileLock,
    corpus: RwLock<Corpus>,
}

impl RetrievalStore {
    /// Open the store described by `config`, selecting its backend.
    pub fn open(config: StoreConfig, embedder: Arc<dyn EmbeddingFunction>) -> StoreResult<Self> {
        let backend = open_backend(&config)?;
        Self::with_backend(config, backend, embedder)
    }

    /// Open over an already constructed backend.
    pub fn with_backend(
        config: StoreConfig,
        backend: Box<dyn CorpusBackend>,
        embedder: Arc<dyn EmbeddingFunction>,
    ) -> StoreResult<Self> {
        let lock = FileLock::for_target(backend.location(), config.lock_timeout())
            .with_poll_interval(config.lock_poll_interval());
        let fingerprint = fingerprint(embedder.as_ref());
        let corpus = lock.with_shared(|| backend.load())?;

        if let Some(stored) = corpus.fingerprint.as_deref().filter(|fp| *fp != fingerprint) {
            events::corpus_stale(backend.location(), stored, &fingerprint);
        }
        tracing::info!(
            backend = backend.name(),
            location = %backend.location().display(),
            documents = corpus.len(),
            "retrieval store opened"
        );

        Ok(Self {
            config,
            backend,
            embedder,
            fingerprint,
            lock,
            corpus: RwLock::new(corpus),
        })
    }

    /// Insert documents, skipping flagged ones and anything already stored.
    ///
    /// Embedding failures are per document: the rest of the batch is
    /// still stored and the failures are counted in the report.
    pub fn add(&self, documents: Vec<Document>) -> StoreResult<AddReport> {
        if documents.is_empty() {
            return Ok(AddReport::default());
        }

        let report = self.lock.with_exclusive(|| {
            let mut corpus = self.backend.load()?;
            let plan = {
                let existing: HashSet<&str> =
                    corpus.documents.iter().map(|d| d.key.as_str()).collect();
                plan_insert(&existing, documents)
            };
            let (duplicates, skipped) = (plan.duplicates, plan.skipped);
            let (stored, failed) = embed_plan(self.embedder.as_ref(), plan);
            let added = stored.len();

            if added > 0 {
                self.backend.append(&stored, &self.fingerprint)?;
                corpus.documents.extend(stored);
                if corpus.fingerprint.is_none() {
                    corpus.fingerprint = Some(self.fingerprint.clone());
                }
            }
            *self.write() = corpus;

            Ok::<_, StoreError>(AddReport {
                added,
                duplicates,
                skipped,
                failed,
            })
        })?;

        events::documents_added(report.added, report.duplicates, report.skipped, report.failed);
        Ok(report)
    }

    /// Parallel-array form of [`add`](Self::add). Missing metadata is empty.
    pub fn add_texts<S: AsRef<str>>(
        &self,
        texts: &[S],
        metadatas: Option<&[Metadata]>,
    ) -> StoreResult<AddReport> {
        if let Some(metadatas) = metadatas {
            if metadatas.len() != texts.len() {
                return Err(StoreError::InvalidInput {
                    reason: format!("{} texts but {} metadatas", texts.len(), metadatas.len()),
                });
            }
        }

        let documents = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let metadata = metadatas.map(|m| m[i].clone()).unwrap_or_default();
                Document::new(text.as_ref(), metadata)
            })
            .collect();
        self.add(documents)
    }

    /// The `k` stored documents most similar to `query`, best first.
    ///
    /// Only documents matching `filter` are considered. An empty corpus or
    /// `k == 0` yields no hits without consulting the embedder.
    pub fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> StoreResult<Vec<SearchHit>> {
        if k == 0 || self.read().is_empty() {
            return Ok(Vec::new());
        }

        let mut vector = self.embedder.embed_query(query)?;
        l2_normalize(&mut vector);
        Ok(rank(&self.read().documents, &vector, k, filter))
    }

    /// Drop documents ingested more than `ttl_days` before `now`.
    ///
    /// `None` or `0` disables retention. Undated documents are kept.
    pub fn retention_purge(&self, now: DateTime<Utc>, ttl_days: Option<u32>) -> StoreResult<usize> {
        let Some(ttl) = ttl_days.filter(|&days| days > 0) else {
            return Ok(0);
        };
        let removed = self.rewrite(|corpus| purge_expired(&mut corpus.documents, now, ttl_days))?;
        if removed > 0 {
            events::retention_purged(removed, ttl);
        }
        Ok(removed)
    }

    /// Apply the configured retention as of now.
    pub fn apply_retention(&self) -> StoreResult<usize> {
        self.retention_purge(Utc::now(), self.config.retention_days)
    }

    /// Rebuild the corpus: dedupe, apply configured retention and
    /// re-embed where the stored vectors no longer fit the embedder.
    pub fn reindex(&self) -> StoreResult<ReindexReport> {
        self.reindex_at(Utc::now())
    }

    pub fn reindex_at(&self, now: DateTime<Utc>) -> StoreResult<ReindexReport> {
        let report = self.lock.with_exclusive(|| {
            let mut corpus = self.backend.load()?;
            let report = rebuild(
                &mut corpus,
                self.embedder.as_ref(),
                &self.fingerprint,
                now,
                self.config.retention_days,
            );
            self.backend.replace_all(&corpus)?;
            *self.write() = corpus;
            Ok::<_, StoreError>(report)
        })?;

        events::reindexed(report.kept, report.duplicates, report.expired, report.reembedded);
        if report.failed > 0 {
            tracing::warn!(failed = report.failed, "reindex left stale vectors in place");
        }
        Ok(report)
    }

    /// Remove every document whose metadata fails `keep`.
    pub fn delete_by_predicate<P>(&self, keep: P) -> StoreResult<usize>
    where
        P: Fn(&Metadata) -> bool,
    {
        let removed = self.rewrite(|corpus| {
            let before = corpus.len();
            corpus.documents.retain(|doc| keep(&doc.metadata));
            before - corpus.len()
        })?;
        if removed > 0 {
            events::documents_deleted(removed, "predicate");
        }
        Ok(removed)
    }

    /// Remove documents by their position in [`list_documents`](Self::list_documents).
    ///
    /// Positions are resolved to dedupe keys against this handle's view
    /// before locking, so writes made elsewhere in the meantime cannot
    /// shift them onto other documents. Out-of-range positions are ignored.
    pub fn delete_indices(&self, indices: &[usize]) -> StoreResult<usize> {
        let keys: HashSet<String> = {
            let corpus = self.read();
            indices
                .iter()
                .filter_map(|&i| corpus.documents.get(i))
                .map(|doc| doc.key.clone())
                .collect()
        };
        if keys.is_empty() {
            return Ok(0);
        }

        let removed = self.rewrite(|corpus| {
            let before = corpus.len();
            corpus.documents.retain(|doc| !keys.contains(&doc.key));
            before - corpus.len()
        })?;
        if removed > 0 {
            events::documents_deleted(removed, "indices");
        }
        Ok(removed)
    }

    /// Keep only documents whose `jurisdiction_tags` include `tag`.
    pub fn purge_to_tag(&self, tag: &str) -> StoreResult<usize> {
        self.delete_by_predicate(|metadata| {
            metadata
                .get(JURISDICTION_TAGS_KEY)
                .is_some_and(|tags| tags.contains_text(tag))
        })
    }

    /// All stored documents in insertion order.
    pub fn list_documents(&self) -> Vec<Document> {
        self.read().documents.iter().map(|d| d.to_document()).collect()
    }

    pub fn stats(&self) -> StoreStats {
        let corpus = self.read();
        StoreStats {
            stored: corpus.len(),
            non_empty: corpus.documents.iter().filter(|d| !d.text.trim().is_empty()).count(),
            dimensions: self.embedder.dimensions(),
            backend: self.backend.name().to_string(),
            fingerprint: corpus.fingerprint.clone(),
        }
    }

    /// Reload the persisted corpus into this handle.
    pub fn refresh(&self) -> StoreResult<()> {
        let corpus = self.lock.with_shared(|| self.backend.load())?;
        *self.write() = corpus;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Reload, apply `remove`, and persist only if it removed something.
    fn rewrite<F>(&self, remove: F) -> StoreResult<usize>
    where
        F: FnOnce(&mut Corpus) -> usize,
    {
        self.lock.with_exclusive(|| {
            let mut corpus = self.backend.load()?;
            let removed = remove(&mut corpus);
            if removed > 0 {
                self.backend.replace_all(&corpus)?;
            }
            *self.write() = corpus;
            Ok(removed)
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Corpus> {
        self.corpus.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Corpus> {
        self.corpus.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RetrievalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalStore")
            .field("backend", &self.backend.name())
            .field("location", &self.backend.location())
            .field("fingerprint", &self.fingerprint)
            .field("documents", &self.len())
            .finish()
    }
}
