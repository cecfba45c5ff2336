//! # docket-core
//!
//! Foundation crate for the docket research stores.
//! Defines the job and document models, collaborator traits, errors,
//! configuration, the cross-process file lock, atomic file rewrites and
//! tracing setup.
//! Every other crate in the workspace depends on this.

pub mod atomic;
pub mod config;
pub mod constants;
pub mod errors;
pub mod lock;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::DocketConfig;
pub use errors::{DocketError, DocketResult};
pub use lock::FileLock;
pub use models::{Document, Job, JobStatus, Metadata, MetadataFilter, MetadataValue, Scalar};
pub use traits::{EmbeddingFunction, GapEstimator};
