//! # docket-store
//!
//! The retrieval store: a persistent corpus of `(text, metadata, vector)`
//! triples with deduplicated inserts, metadata-filtered similarity search,
//! time-based retention and full reindex. Persistence goes through a
//! [`CorpusBackend`](backend::CorpusBackend) chosen once at open: SQLite when
//! it is usable, a single JSON file otherwise.

pub mod backend;
pub mod corpus;
pub mod ingest;
pub mod reindex;
pub mod report;
pub mod retention;
pub mod search;
pub mod store;

pub use backend::{open_backend, CorpusBackend, FileBackend, SqliteBackend};
pub use corpus::{fingerprint, Corpus, StoredDocument};
pub use reindex::ReindexReport;
pub use report::{AddReport, StoreStats};
pub use search::SearchHit;
pub use store::RetrievalStore;
