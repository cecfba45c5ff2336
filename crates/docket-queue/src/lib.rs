//! # docket-queue
//!
//! The adaptive work queue: a JSON-file backlog of research jobs shared by
//! any number of processes. Every mutation is a read-modify-write under a
//! cross-process lock, and dispatch order blends caller priority with an
//! estimate of how much of the target's record is still missing.

pub mod gaps;
pub mod persist;
pub mod queue;
pub mod sanitize;
pub mod scoring;
pub mod stats;

pub use gaps::RecordGapEstimator;
pub use queue::AdaptiveWorkQueue;
pub use sanitize::{strip_merge_markers, Sanitized};
pub use stats::QueueStats;
