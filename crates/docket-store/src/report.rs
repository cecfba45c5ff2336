//! Operation reports.

use serde::Serialize;

/// Outcome of one `add` call. Every input lands in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AddReport {
    /// Stored.
    pub added: usize,
    /// Dedupe key already in the corpus or earlier in the same call.
    pub duplicates: usize,
    /// Flagged with a truthy `skip`.
    pub skipped: usize,
    /// Embedding failed or produced the wrong dimensionality.
    pub failed: usize,
}

impl AddReport {
    pub fn total(&self) -> usize {
        self.added + self.duplicates + self.skipped + self.failed
    }
}

/// Corpus summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub stored: usize,
    /// Documents with non-blank text.
    pub non_empty: usize,
    pub dimensions: usize,
    pub backend: String,
    pub fingerprint: Option<String>,
}
