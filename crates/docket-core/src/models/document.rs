//! Evidence document model and dedupe-key derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metadata::{Metadata, MetadataValue};
use super::timestamp::parse_utc;
use crate::constants::{INGESTED_AT_KEY, SKIP_KEY, URL_KEY};

/// An opaque `(text, metadata)` pair as callers see it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    pub fn dedupe_key(&self) -> String {
        dedupe_key(&self.text, &self.metadata)
    }

    /// Parsed `ingested_at`, if present and readable.
    pub fn ingested_at(&self) -> Option<DateTime<Utc>> {
        ingested_at(&self.metadata)
    }

    /// Documents flagged with a truthy `skip` are never ingested.
    pub fn should_ingest(&self) -> bool {
        !self
            .metadata
            .get(SKIP_KEY)
            .is_some_and(MetadataValue::is_truthy)
    }
}

/// The `ingested_at` metadata field as a UTC timestamp, if readable.
pub fn ingested_at(metadata: &Metadata) -> Option<DateTime<Utc>> {
    metadata
        .get(INGESTED_AT_KEY)
        .and_then(MetadataValue::as_str)
        .and_then(parse_utc)
}

/// blake3 hex digest of a document's text.
pub fn content_hash(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// The key two documents must share to count as duplicates.
///
/// A scalar `url` metadata field wins; otherwise the content hash of the text.
/// `null`, empty and list-valued `url` fields fall back to the hash.
pub fn dedupe_key(text: &str, metadata: &Metadata) -> String {
    match metadata.get(URL_KEY).and_then(MetadataValue::as_scalar) {
        Some(url) if url.is_truthy() => url.to_string(),
        _ => content_hash(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scalar;

    fn meta(pairs: &[(&str, MetadataValue)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn url_is_preferred_dedupe_key() {
        let m = meta(&[("url", "http://a".into())]);
        assert_eq!(dedupe_key("anything", &m), "http://a");
    }

    #[test]
    fn content_hash_when_url_missing_or_empty() {
        let hash = content_hash("same text");
        assert_eq!(dedupe_key("same text", &Metadata::new()), hash);
        assert_eq!(dedupe_key("same text", &meta(&[("url", "".into())])), hash);
        assert_eq!(
            dedupe_key("same text", &meta(&[("url", MetadataValue::Scalar(Scalar::Null))])),
            hash
        );
        assert_ne!(dedupe_key("other text", &Metadata::new()), hash);
    }

    #[test]
    fn skip_flag_blocks_ingestion() {
        assert!(Document::new("a", Metadata::new()).should_ingest());
        assert!(Document::new("a", meta(&[("skip", false.into())])).should_ingest());
        assert!(!Document::new("a", meta(&[("skip", true.into())])).should_ingest());
    }

    #[test]
    fn ingested_at_parses_or_is_absent() {
        let doc = Document::new("a", meta(&[("ingested_at", "2024-01-02T00:00:00Z".into())]));
        assert!(doc.ingested_at().is_some());
        let doc = Document::new("a", meta(&[("ingested_at", "not a date".into())]));
        assert!(doc.ingested_at().is_none());
        assert!(Document::new("a", Metadata::new()).ingested_at().is_none());
    }
}
