//! Gap estimation from on-disk target records.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use docket_core::config::GapConfig;
use docket_core::constants::MISSING_RECORD_GAP_FACTOR;
use docket_core::GapEstimator;

/// Scores a target by how many required fields its JSON record lacks.
///
/// The record lives at `records_dir/<target_id>`. A field counts as
/// missing when absent, `null` or the empty string. A record that is
/// missing, unreadable, not valid JSON or not a JSON object scores
/// `required_fields.len() * 10` so it is researched first.
#[derive(Debug, Clone)]
pub struct RecordGapEstimator {
    records_dir: PathBuf,
    required_fields: Vec<String>,
}

impl RecordGapEstimator {
    pub fn new(records_dir: impl Into<PathBuf>, required_fields: Vec<String>) -> Self {
        Self {
            records_dir: records_dir.into(),
            required_fields,
        }
    }

    pub fn from_config(config: &GapConfig) -> Self {
        Self::new(config.records_dir.clone(), config.required_fields.clone())
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    fn missing_record_score(&self) -> u32 {
        (self.required_fields.len() as u32).saturating_mul(MISSING_RECORD_GAP_FACTOR)
    }
}

impl GapEstimator for RecordGapEstimator {
    fn estimate(&self, target_id: &str) -> u32 {
        let path = self.records_dir.join(target_id);
        let record = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());

        let Some(Value::Object(fields)) = record else {
            tracing::debug!(target_id, path = %path.display(), "no usable record, maximum gap");
            return self.missing_record_score();
        };

        self.required_fields
            .iter()
            .filter(|name| match fields.get(name.as_str()) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            })
            .count() as u32
    }
}
