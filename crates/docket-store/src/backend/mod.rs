//! Corpus persistence backends and startup selection.

pub mod file;
pub mod sqlite;

use std::path::Path;

use docket_core::config::{BackendKind, StoreConfig};
use docket_core::errors::StoreResult;
use docket_core::logging::events;

use crate::corpus::{Corpus, StoredDocument};

pub use file::FileBackend;
pub use sqlite::SqliteBackend;

/// Durable storage for a corpus.
///
/// Callers serialize access with the store lock; backends only have to
/// make each call atomic on its own.
pub trait CorpusBackend: Send + Sync {
    /// Short backend name for stats and logs.
    fn name(&self) -> &'static str;

    /// File the corpus lives in. The store lock sits next to it.
    fn location(&self) -> &Path;

    /// Read the whole corpus in insertion order.
    fn load(&self) -> StoreResult<Corpus>;

    /// Persist `documents` after the existing ones. Records `fingerprint`
    /// only if the corpus has none yet.
    fn append(&self, documents: &[StoredDocument], fingerprint: &str) -> StoreResult<()>;

    /// Replace the persisted corpus wholesale.
    fn replace_all(&self, corpus: &Corpus) -> StoreResult<()>;
}

/// Open the backend named by `config.backend`.
///
/// `auto` probes SQLite first and falls back to the file backend, logging
/// the degradation. The choice is final for the life of the store.
pub fn open_backend(config: &StoreConfig) -> StoreResult<Box<dyn CorpusBackend>> {
    match config.backend {
        BackendKind::Sqlite => Ok(Box::new(SqliteBackend::open(&config.path, config.busy_timeout())?)),
        BackendKind::File => Ok(Box::new(FileBackend::new(config.file_path()))),
        BackendKind::Auto => match SqliteBackend::open(&config.path, config.busy_timeout()) {
            Ok(sqlite) => Ok(Box::new(sqlite)),
            Err(e) => {
                events::backend_degraded("retrieval_store", &e.to_string(), FileBackend::NAME);
                Ok(Box::new(FileBackend::new(config.file_path())))
            }
        },
    }
}
