//! Queue file encoding.
//!
//! The file is a pretty-printed JSON array of jobs in insertion order,
//! rewritten in full on every mutation.

use std::fs;
use std::io;
use std::path::Path;

use docket_core::atomic::write_atomic;
use docket_core::errors::{QueueError, QueueResult};
use docket_core::logging::events;
use docket_core::Job;

use crate::sanitize::strip_merge_markers;

/// Read the queue file. A missing or blank file is an empty queue.
pub fn read_jobs(path: &Path) -> QueueResult<Vec<Job>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(QueueError::Persistence {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };
    decode_jobs(path, &raw)
}

/// Parse queue file content after stripping merge markers.
pub fn decode_jobs(path: &Path, raw: &str) -> QueueResult<Vec<Job>> {
    let sanitized = strip_merge_markers(raw);
    if sanitized.was_modified() {
        events::merge_markers_stripped(path, sanitized.stripped);
    }
    if sanitized.content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&sanitized.content).map_err(|e| QueueError::CorruptState {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Atomically rewrite the queue file.
pub fn write_jobs(path: &Path, jobs: &[Job]) -> QueueResult<()> {
    let persistence = |message: String| QueueError::Persistence {
        path: path.display().to_string(),
        message,
    };
    let mut body = serde_json::to_string_pretty(jobs).map_err(|e| persistence(e.to_string()))?;
    body.push('\n');
    write_atomic(path, body.as_bytes()).map_err(|e| persistence(e.to_string()))
}
