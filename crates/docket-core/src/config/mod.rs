//! Configuration system for docket.
//! TOML-based, 3-layer resolution: env > project > defaults.

pub mod defaults;
pub mod docket_config;
pub mod embedding_config;
pub mod gap_config;
pub mod queue_config;
pub mod store_config;

pub use docket_config::DocketConfig;
pub use embedding_config::EmbeddingConfig;
pub use gap_config::GapConfig;
pub use queue_config::QueueConfig;
pub use store_config::{BackendKind, StoreConfig};
