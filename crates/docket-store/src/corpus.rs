//! In-memory corpus representation shared by every backend.

use docket_core::models::dedupe_key;
use docket_core::{Document, EmbeddingFunction, Metadata};

/// One stored document with its dedupe key and normalized vector.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub key: String,
    pub text: String,
    pub metadata: Metadata,
    pub vector: Vec<f32>,
}

impl StoredDocument {
    /// Build a record, deriving the dedupe key from text and metadata.
    pub fn new(text: String, metadata: Metadata, vector: Vec<f32>) -> Self {
        Self {
            key: dedupe_key(&text, &metadata),
            text,
            metadata,
            vector,
        }
    }

    /// The caller-facing `(text, metadata)` pair.
    pub fn to_document(&self) -> Document {
        Document::new(self.text.clone(), self.metadata.clone())
    }
}

/// Everything a backend persists: the documents in insertion order and
/// the fingerprint of the embedder that produced their vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    pub documents: Vec<StoredDocument>,
    pub fingerprint: Option<String>,
}

impl Corpus {
    pub fn new(documents: Vec<StoredDocument>, fingerprint: Option<String>) -> Self {
        Self {
            documents,
            fingerprint,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Whether the stored vectors were produced by a different embedder.
    /// A corpus that never recorded a fingerprint is not considered stale.
    pub fn is_stale_for(&self, current: &str) -> bool {
        self.fingerprint.as_deref().is_some_and(|fp| fp != current)
    }
}

/// Identity of an embedder's vector space: `<name>:<dimensions>`.
pub fn fingerprint(embedder: &dyn EmbeddingFunction) -> String {
    format!("{}:{}", embedder.name(), embedder.dimensions())
}
