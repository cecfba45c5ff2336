//! Data model shared by the queue and the retrieval store.

pub mod document;
pub mod filter;
pub mod job;
pub mod metadata;
pub mod timestamp;

pub use document::{content_hash, dedupe_key, ingested_at, Document};
pub use filter::MetadataFilter;
pub use job::{Job, JobStatus};
pub use metadata::{Metadata, MetadataValue, Scalar};
pub use timestamp::parse_utc;
