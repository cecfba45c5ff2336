use serde::Serialize;

use docket_core::{Job, JobStatus};

/// Job counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub error: usize,
}

impl QueueStats {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        jobs.iter().fold(Self::default(), |mut stats, job| {
            stats.total += 1;
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::InProgress => stats.in_progress += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Error => stats.error += 1,
            }
            stats
        })
    }
}
