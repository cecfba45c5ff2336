//! Compiled default values for every config section.

/// Name of the project-level config file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "docket.toml";

// Queue defaults
pub const DEFAULT_QUEUE_PATH: &str = "tools/research_queue.json";
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOCK_POLL_INTERVAL_MS: u64 = 25;

// Store defaults
pub const DEFAULT_STORE_PATH: &str = ".vector/corpus.sqlite";
pub const DEFAULT_SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

// Embedding defaults
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "hash";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_EMBEDDING_CACHE_SIZE: u64 = 10_000;

// Gap estimation defaults
pub const DEFAULT_RECORDS_DIR: &str = ".";
pub const DEFAULT_REQUIRED_FIELDS: &[&str] = &["jurisdiction", "last_updated"];
