//! Top-level docket configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{defaults, BackendKind, EmbeddingConfig, GapConfig, QueueConfig, StoreConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sections.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`DOCKET_*`)
/// 2. Project config (`docket.toml` in the project root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocketConfig {
    pub queue: QueueConfig,
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub gaps: GapConfig,
}

impl DocketConfig {
    /// Load configuration for the project rooted at `root`.
    ///
    /// Relative paths in the result are resolved against `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(defaults::CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        config.resolve_paths(root);

        Ok(config)
    }

    /// Read a config file. Unknown keys are ignored.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `DOCKET_*` overrides read through `lookup`.
    ///
    /// Values that fail to parse are rejected rather than silently dropped.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DOCKET_QUEUE_PATH") {
            self.queue.path = PathBuf::from(val);
        }
        if let Some(val) = lookup("DOCKET_QUEUE_LOCK_TIMEOUT_MS") {
            self.queue.lock_timeout_ms = parse_env("DOCKET_QUEUE_LOCK_TIMEOUT_MS", &val)?;
        }
        if let Some(val) = lookup("DOCKET_STORE_PATH") {
            self.store.path = PathBuf::from(val);
        }
        if let Some(val) = lookup("DOCKET_STORE_BACKEND") {
            self.store.backend = val.parse::<BackendKind>()?;
        }
        if let Some(val) = lookup("DOCKET_STORE_RETENTION_DAYS") {
            self.store.retention_days = if val.trim().is_empty() {
                None
            } else {
                Some(parse_env("DOCKET_STORE_RETENTION_DAYS", &val)?)
            };
        }
        if let Some(val) = lookup("DOCKET_EMBEDDING_DIMENSIONS") {
            self.embedding.dimensions = parse_env("DOCKET_EMBEDDING_DIMENSIONS", &val)?;
        }
        if let Some(val) = lookup("DOCKET_GAPS_RECORDS_DIR") {
            self.gaps.records_dir = PathBuf::from(val);
        }
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue.path.as_os_str().is_empty() {
            return Err(invalid("queue.path", "must not be empty"));
        }
        if self.queue.lock_timeout_ms == 0 {
            return Err(invalid("queue.lock_timeout_ms", "must be greater than 0"));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(invalid("store.path", "must not be empty"));
        }
        if self.store.lock_timeout_ms == 0 {
            return Err(invalid("store.lock_timeout_ms", "must be greater than 0"));
        }
        if self.embedding.dimensions == 0 {
            return Err(invalid("embedding.dimensions", "must be greater than 0"));
        }
        if self.embedding.provider.trim().is_empty() {
            return Err(invalid("embedding.provider", "must not be empty"));
        }
        Ok(())
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    fn resolve_paths(&mut self, root: &Path) {
        for path in [
            &mut self.queue.path,
            &mut self.store.path,
            &mut self.gaps.records_dir,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, val: &str) -> Result<T, ConfigError> {
    val.trim().parse::<T>().map_err(|_| ConfigError::ValidationFailed {
        field: key.to_string(),
        message: format!("cannot parse '{val}'"),
    })
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
