//! Dispatch order holds for arbitrary priorities and gaps.

use std::collections::HashMap;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use docket_core::config::QueueConfig;
use docket_core::Job;
use docket_queue::AdaptiveWorkQueue;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn effective_scores_never_increase(
        entries in prop::collection::vec((-5i64..20, 0u32..20), 1..12),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let queue = AdaptiveWorkQueue::open(dir.path().join("q.json"), &QueueConfig::default()).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut gap_of = HashMap::new();
        for (i, (priority, gap)) in entries.iter().enumerate() {
            let target = format!("t{i}");
            gap_of.insert(target.clone(), *gap);
            queue.add(Job::inserted_at(target, *priority, start + Duration::seconds(i as i64))).unwrap();
        }
        let gaps = move |t: &str| gap_of.get(t).copied().unwrap_or(0);

        let mut last: Option<(i64, u32)> = None;
        let mut count = 0;
        while let Some(job) = queue.next(Some(&gaps)).unwrap() {
            let gap = gaps(job.target_id.as_str());
            let effective = job.priority.max(i64::from(gap));
            if let Some((prev_eff, prev_gap)) = last {
                prop_assert!(effective < prev_eff || (effective == prev_eff && gap <= prev_gap));
            }
            last = Some((effective, gap));
            count += 1;
        }
        prop_assert_eq!(count, entries.len());
    }
}
