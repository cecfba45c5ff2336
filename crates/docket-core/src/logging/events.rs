//! Structured log events for queue and store operations.
//!
//! Each function emits a `tracing` event with structured fields.

use std::path::Path;

/// Log a job appended to the queue.
pub fn job_enqueued(target_id: &str, priority: i64) {
    tracing::info!(
        event = "job_enqueued",
        target_id = %target_id,
        priority = priority,
        "job enqueued"
    );
}

/// Log a job handed out by `next()`.
pub fn job_dispatched(target_id: &str, priority: i64, gap: u32, effective: i64) {
    tracing::info!(
        event = "job_dispatched",
        target_id = %target_id,
        priority = priority,
        gap = gap,
        effective = effective,
        "job dispatched"
    );
}

/// Log a terminal status transition.
pub fn job_finished(target_id: &str, status: &str, updated: usize) {
    tracing::info!(
        event = "job_finished",
        target_id = %target_id,
        status = %status,
        updated = updated,
        "job finished"
    );
}

/// Log merge-conflict marker lines stripped from a queue file.
pub fn merge_markers_stripped(path: &Path, lines: usize) {
    tracing::warn!(
        event = "merge_markers_stripped",
        path = %path.display(),
        lines = lines,
        "merge markers stripped from queue file"
    );
}

/// Log the outcome of a batch insert.
pub fn documents_added(added: usize, duplicates: usize, skipped: usize, failed: usize) {
    tracing::info!(
        event = "documents_added",
        added = added,
        duplicates = duplicates,
        skipped = skipped,
        failed = failed,
        "documents added"
    );
}

/// Log a single document dropped because its embedding failed.
pub fn embedding_failed(dedupe_key: &str, reason: &str) {
    tracing::warn!(
        event = "embedding_failed",
        dedupe_key = %dedupe_key,
        reason = %reason,
        "embedding failed, document skipped"
    );
}

/// Log a retention purge.
pub fn retention_purged(removed: usize, ttl_days: u32) {
    tracing::info!(
        event = "retention_purged",
        removed = removed,
        ttl_days = ttl_days,
        "retention purge completed"
    );
}

/// Log a completed reindex.
pub fn reindexed(kept: usize, duplicates: usize, expired: usize, reembedded: usize) {
    tracing::info!(
        event = "reindexed",
        kept = kept,
        duplicates = duplicates,
        expired = expired,
        reembedded = reembedded,
        "reindex completed"
    );
}

/// Log documents removed by an explicit deletion.
pub fn documents_deleted(removed: usize, reason: &str) {
    tracing::info!(
        event = "documents_deleted",
        removed = removed,
        reason = %reason,
        "documents deleted"
    );
}

/// Log a backend falling back to a weaker one.
pub fn backend_degraded(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "backend_degraded",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "backend degraded"
    );
}

/// Log a corpus whose vectors came from a different embedder.
pub fn corpus_stale(location: &Path, stored: &str, current: &str) {
    tracing::warn!(
        event = "corpus_stale",
        location = %location.display(),
        stored = %stored,
        current = %current,
        "corpus embedded by another provider, reindex to refresh vectors"
    );
}

/// Log a lock that was not immediately available.
pub fn lock_contended(path: &Path) {
    tracing::debug!(
        event = "lock_contended",
        path = %path.display(),
        "waiting for lock"
    );
}
