use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Work queue configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Backing JSON file. The lock file sits next to it.
    pub path: PathBuf,
    /// Upper bound on waiting for the queue lock (milliseconds).
    pub lock_timeout_ms: u64,
    /// Sleep between lock attempts (milliseconds).
    pub lock_poll_interval_ms: u64,
}

impl QueueConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::DEFAULT_QUEUE_PATH),
            lock_timeout_ms: defaults::DEFAULT_LOCK_TIMEOUT_MS,
            lock_poll_interval_ms: defaults::DEFAULT_LOCK_POLL_INTERVAL_MS,
        }
    }
}
