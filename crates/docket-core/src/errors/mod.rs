//! Error handling for docket.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod docket_error;
pub mod embedding_error;
pub mod lock_error;
pub mod queue_error;
pub mod store_error;

pub use config_error::ConfigError;
pub use docket_error::{DocketError, DocketResult};
pub use embedding_error::{EmbeddingError, EmbeddingResult};
pub use lock_error::LockError;
pub use queue_error::{QueueError, QueueResult};
pub use store_error::{StoreError, StoreResult};
