use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Gap estimation over on-disk target records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// Directory that target ids are resolved against.
    pub records_dir: PathBuf,
    /// Fields a complete record must carry with a non-empty value.
    pub required_fields: Vec<String>,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            records_dir: PathBuf::from(defaults::DEFAULT_RECORDS_DIR),
            required_fields: defaults::DEFAULT_REQUIRED_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}
