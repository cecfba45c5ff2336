//! The adaptive work queue.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use docket_core::config::QueueConfig;
use docket_core::errors::QueueResult;
use docket_core::logging::events;
use docket_core::{FileLock, GapEstimator, Job, JobStatus};

use crate::persist::{read_jobs, write_jobs};
use crate::scoring::rank_pending;
use crate::stats::QueueStats;

/// A persistent job backlog shared by every process that opens the same file.
///
/// The backing file is the source of truth. Each mutation takes the
/// exclusive lock on `<file>.lock`, re-reads the file, applies the change
/// and rewrites the file before releasing the lock, so two processes
/// calling [`next`](Self::next) never receive the same job. The in-memory
/// snapshot behind [`jobs`](Self::jobs) reflects the last read or write
/// made through this handle.
///
/// Duplicate `target_id`s are accepted. Each copy is dispatched on its
/// own, and the `mark_*` methods update every copy.
pub struct AdaptiveWorkQueue {
    path: PathBuf,
    lock: FileLock,
    snapshot: Mutex<Vec<Job>>,
}

impl AdaptiveWorkQueue {
    /// Open the queue stored at `path` and load it.
    pub fn open(path: impl Into<PathBuf>, config: &QueueConfig) -> QueueResult<Self> {
        let path = path.into();
        let lock = FileLock::for_target(&path, config.lock_timeout())
            .with_poll_interval(config.lock_poll_interval());
        let queue = Self {
            path,
            lock,
            snapshot: Mutex::new(Vec::new()),
        };
        queue.load()?;
        Ok(queue)
    }

    /// Open the queue at `config.path`.
    pub fn from_config(config: &QueueConfig) -> QueueResult<Self> {
        Self::open(config.path.clone(), config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the backing file into the snapshot.
    pub fn load(&self) -> QueueResult<()> {
        let jobs = self.lock.with_shared(|| read_jobs(&self.path))?;
        *self.snapshot() = jobs;
        Ok(())
    }

    /// Append a job as given and persist.
    pub fn add(&self, job: Job) -> QueueResult<()> {
        let (target_id, priority) = (job.target_id.clone(), job.priority);
        self.transact(|jobs| {
            jobs.push(job);
            ((), true)
        })?;
        events::job_enqueued(&target_id, priority);
        Ok(())
    }

    /// Append a pending job for `target_id` inserted now.
    pub fn add_target(&self, target_id: impl Into<String>, priority: i64) -> QueueResult<Job> {
        let job = Job::new(target_id, priority);
        self.add(job.clone())?;
        Ok(job)
    }

    /// Dispatch the best pending job, flipping it to `in_progress`.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    pub fn next(&self, gaps: Option<&dyn GapEstimator>) -> QueueResult<Option<Job>> {
        self.transact(|jobs| {
            let Some(best) = rank_pending(jobs, gaps).into_iter().next() else {
                return (None, false);
            };
            let job = &mut jobs[best.index];
            job.status = JobStatus::InProgress;
            events::job_dispatched(&job.target_id, job.priority, best.gap, best.effective);
            (Some(job.clone()), true)
        })
    }

    /// Mark every job for `target_id` completed. Returns how many changed.
    pub fn mark_completed(&self, target_id: &str) -> QueueResult<usize> {
        self.finish(target_id, JobStatus::Completed, None)
    }

    /// Mark every job for `target_id` failed with `message`. Returns how many changed.
    pub fn mark_error(&self, target_id: &str, message: impl Into<String>) -> QueueResult<usize> {
        self.finish(target_id, JobStatus::Error, Some(message.into()))
    }

    /// Snapshot of all jobs in file order.
    pub fn jobs(&self) -> Vec<Job> {
        self.snapshot().clone()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats::from_jobs(&self.snapshot())
    }

    pub fn pending_count(&self) -> usize {
        self.snapshot().iter().filter(|j| j.is_pending()).count()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn finish(&self, target_id: &str, status: JobStatus, error: Option<String>) -> QueueResult<usize> {
        let updated = self.transact(|jobs| {
            let mut updated = 0;
            for job in jobs.iter_mut().filter(|j| j.target_id == target_id) {
                if job.status != status || job.error != error {
                    job.status = status;
                    job.error = error.clone();
                    updated += 1;
                }
            }
            (updated, updated > 0)
        })?;
        if updated > 0 {
            events::job_finished(target_id, status.as_str(), updated);
        }
        Ok(updated)
    }

    /// Read-modify-write under the exclusive lock.
    ///
    /// `apply` returns its output and whether the job list changed; the
    /// file is only rewritten when it did.
    fn transact<T, F>(&self, apply: F) -> QueueResult<T>
    where
        F: FnOnce(&mut Vec<Job>) -> (T, bool),
    {
        self.lock.with_exclusive(|| {
            let mut jobs = read_jobs(&self.path)?;
            let (out, changed) = apply(&mut jobs);
            if changed {
                write_jobs(&self.path, &jobs)?;
            }
            *self.snapshot() = jobs;
            Ok(out)
        })
    }

    fn snapshot(&self) -> MutexGuard<'_, Vec<Job>> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AdaptiveWorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveWorkQueue")
            .field("path", &self.path)
            .field("jobs", &self.len())
            .finish()
    }
}
