//! Time-based retention over `metadata.ingested_at`.

use chrono::{DateTime, TimeDelta, Utc};

use docket_core::models::ingested_at;

use crate::corpus::StoredDocument;

/// Cutoff for a TTL, or `None` when retention is disabled (`None` or 0 days).
///
/// A TTL reaching past the earliest representable time has no cutoff:
/// nothing can be that old.
pub fn cutoff(now: DateTime<Utc>, ttl_days: Option<u32>) -> Option<DateTime<Utc>> {
    let days = ttl_days.filter(|&days| days > 0)?;
    now.checked_sub_signed(TimeDelta::try_days(i64::from(days))?)
}

/// Whether a document was ingested strictly before `cutoff`.
/// Documents without a readable `ingested_at` never expire.
pub fn is_expired(doc: &StoredDocument, cutoff: DateTime<Utc>) -> bool {
    ingested_at(&doc.metadata).is_some_and(|at| at < cutoff)
}

/// Remove expired documents in place. Returns how many were removed.
pub fn purge_expired(
    documents: &mut Vec<StoredDocument>,
    now: DateTime<Utc>,
    ttl_days: Option<u32>,
) -> usize {
    let Some(cutoff) = cutoff(now, ttl_days) else {
        return 0;
    };
    let before = documents.len();
    documents.retain(|doc| !is_expired(doc, cutoff));
    before - documents.len()
}
