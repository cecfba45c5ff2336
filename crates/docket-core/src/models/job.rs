//! Work queue job model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::serde_utc;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One research unit tracked by the work queue.
///
/// `target_id` is opaque to the queue. Uniqueness is not enforced: two
/// pending jobs may share a target and both will be dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Older queue files name this field `jurisdiction_path`.
    #[serde(alias = "jurisdiction_path")]
    pub target_id: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "Utc::now", with = "serde_utc")]
    pub inserted_at: DateTime<Utc>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub error: Option<String>,
}

impl Job {
    /// A new pending job inserted now.
    pub fn new(target_id: impl Into<String>, priority: i64) -> Self {
        Self::inserted_at(target_id, priority, Utc::now())
    }

    /// A new pending job with an explicit insertion time.
    pub fn inserted_at(target_id: impl Into<String>, priority: i64, at: DateTime<Utc>) -> Self {
        Self {
            target_id: target_id.into(),
            priority,
            inserted_at: at,
            status: JobStatus::Pending,
            error: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == JobStatus::Pending
    }
}
