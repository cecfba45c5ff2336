//! Dispatch ordering.
//!
//! `effective = max(priority, gap)`. Pending jobs are ranked by effective
//! score descending, then gap descending, then oldest first. Remaining
//! ties keep file order.

use std::cmp::Ordering;
use std::collections::HashMap;

use docket_core::{GapEstimator, Job};

/// A pending job with its computed scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Position in the queue's job list.
    pub index: usize,
    pub gap: u32,
    pub effective: i64,
}

/// Rank every pending job, best first.
///
/// Each distinct target is estimated once even when it appears in several jobs.
pub fn rank_pending(jobs: &[Job], gaps: Option<&dyn GapEstimator>) -> Vec<Candidate> {
    let mut estimates: HashMap<&str, u32> = HashMap::new();
    let mut candidates: Vec<Candidate> = jobs
        .iter()
        .enumerate()
        .filter(|(_, job)| job.is_pending())
        .map(|(index, job)| {
            let gap = match gaps {
                Some(source) => *estimates
                    .entry(job.target_id.as_str())
                    .or_insert_with(|| source.estimate(&job.target_id)),
                None => 0,
            };
            Candidate {
                index,
                gap,
                effective: job.priority.max(i64::from(gap)),
            }
        })
        .collect();

    candidates.sort_by(|a, b| compare(jobs, a, b));
    candidates
}

fn compare(jobs: &[Job], a: &Candidate, b: &Candidate) -> Ordering {
    b.effective
        .cmp(&a.effective)
        .then_with(|| b.gap.cmp(&a.gap))
        .then_with(|| jobs[a.index].inserted_at.cmp(&jobs[b.index].inserted_at))
}
