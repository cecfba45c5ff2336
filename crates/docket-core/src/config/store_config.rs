use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Which persistence backend the retrieval store uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Probe SQLite first, fall back to the single-file backend.
    #[default]
    Auto,
    Sqlite,
    File,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Sqlite => "sqlite",
            Self::File => "file",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "sqlite" => Ok(Self::Sqlite),
            "file" | "json" => Ok(Self::File),
            other => Err(ConfigError::ValidationFailed {
                field: "store.backend".to_string(),
                message: format!("unknown backend '{other}' (expected auto, sqlite or file)"),
            }),
        }
    }
}

/// Retrieval store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path. The file backend uses the same path with a `.json` extension.
    pub path: PathBuf,
    pub backend: BackendKind,
    /// Documents older than this many days are purged on reindex. `None` or 0 disables.
    pub retention_days: Option<u32>,
    pub lock_timeout_ms: u64,
    pub lock_poll_interval_ms: u64,
    /// SQLite `busy_timeout` pragma (milliseconds).
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    /// Store rooted at `path` with every other setting at its default.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_retention_days(mut self, days: Option<u32>) -> Self {
        self.retention_days = days;
        self
    }

    /// Path of the single-file JSON corpus.
    pub fn file_path(&self) -> PathBuf {
        self.path.with_extension("json")
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::DEFAULT_STORE_PATH),
            backend: BackendKind::default(),
            retention_days: None,
            lock_timeout_ms: defaults::DEFAULT_LOCK_TIMEOUT_MS,
            lock_poll_interval_ms: defaults::DEFAULT_LOCK_POLL_INTERVAL_MS,
            busy_timeout_ms: defaults::DEFAULT_SQLITE_BUSY_TIMEOUT_MS,
        }
    }
}
