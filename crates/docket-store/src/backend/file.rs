//! Single-file JSON corpus backend.
//!
//! Parallel arrays `texts`, `metadatas` and `vectors`, rewritten in full
//! and atomically on every write. Dedupe keys are derived on load rather
//! than stored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use docket_core::atomic::write_atomic;
use docket_core::errors::{StoreError, StoreResult};
use docket_core::Metadata;

use super::CorpusBackend;
use crate::corpus::{Corpus, StoredDocument};

/// On-disk layout.
///
/// Files written before vectors were persisted lack `vectors`; their
/// documents load with empty vectors and are re-embedded on reindex.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CorpusFile {
    #[serde(default)]
    dimensions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
    #[serde(default)]
    texts: Vec<String>,
    #[serde(default)]
    metadatas: Vec<Metadata>,
    #[serde(default)]
    vectors: Vec<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub const NAME: &'static str = "file";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_file(&self) -> StoreResult<Option<CorpusFile>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Persistence {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| self.corrupt(e.to_string()))
    }

    fn write_file(&self, corpus: &Corpus) -> StoreResult<()> {
        let file = CorpusFile {
            dimensions: uniform_dimensions(corpus),
            fingerprint: corpus.fingerprint.clone(),
            texts: corpus.documents.iter().map(|d| d.text.clone()).collect(),
            metadatas: corpus.documents.iter().map(|d| d.metadata.clone()).collect(),
            vectors: corpus.documents.iter().map(|d| d.vector.clone()).collect(),
        };
        let body = serde_json::to_vec(&file).map_err(|e| self.persistence(e.to_string()))?;
        write_atomic(&self.path, &body).map_err(|e| self.persistence(e.to_string()))
    }

    fn corrupt(&self, reason: impl Into<String>) -> StoreError {
        StoreError::CorruptState {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }

    fn persistence(&self, message: String) -> StoreError {
        StoreError::Persistence {
            path: self.path.display().to_string(),
            message,
        }
    }
}

impl CorpusBackend for FileBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<Corpus> {
        let Some(file) = self.read_file()? else {
            return Ok(Corpus::default());
        };

        let count = file.texts.len();
        if file.metadatas.len() != count {
            return Err(self.corrupt(format!(
                "{count} texts but {} metadatas",
                file.metadatas.len()
            )));
        }
        if !file.vectors.is_empty() && file.vectors.len() != count {
            return Err(self.corrupt(format!(
                "{count} texts but {} vectors",
                file.vectors.len()
            )));
        }

        let mut vectors = file.vectors.into_iter();
        let documents = file
            .texts
            .into_iter()
            .zip(file.metadatas)
            .map(|(text, metadata)| {
                StoredDocument::new(text, metadata, vectors.next().unwrap_or_default())
            })
            .collect();
        Ok(Corpus::new(documents, file.fingerprint))
    }

    fn append(&self, documents: &[StoredDocument], fingerprint: &str) -> StoreResult<()> {
        let mut corpus = self.load()?;
        corpus.documents.extend_from_slice(documents);
        if corpus.fingerprint.is_none() {
            corpus.fingerprint = Some(fingerprint.to_string());
        }
        self.write_file(&corpus)
    }

    fn replace_all(&self, corpus: &Corpus) -> StoreResult<()> {
        self.write_file(corpus)
    }
}

/// The vector length shared by every document, or 0 when the corpus is
/// empty or mixes lengths (vectors left over from another embedder).
fn uniform_dimensions(corpus: &Corpus) -> usize {
    let mut lengths = corpus.documents.iter().map(|d| d.vector.len());
    match lengths.next() {
        Some(first) if lengths.all(|len| len == first) => first,
        _ => 0,
    }
}
