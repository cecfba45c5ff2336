//! Cross-process advisory lock co-located with a backing file.
//!
//! Wraps `fd-lock` (flock on Unix, LockFileEx on Windows). Every call opens
//! its own handle, so two threads of one process exclude each other the
//! same way two processes do. Acquisition polls `try_write` until the
//! timeout elapses.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::defaults::DEFAULT_LOCK_POLL_INTERVAL_MS;
use crate::constants::LOCK_FILE_SUFFIX;
use crate::errors::LockError;
use crate::logging::events;

/// The lock file guarding `target`: same directory, `.lock` appended.
pub fn lock_path_for(target: &Path) -> PathBuf {
    sibling_with_suffix(target, LOCK_FILE_SUFFIX)
}

/// `target` with `suffix` appended to its file name.
pub fn sibling_with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("docket"));
    name.push(suffix);
    target.with_file_name(name)
}

/// A scoped exclusive (or shared) lock on a backing file.
#[derive(Debug, Clone)]
pub struct FileLock {
    path: PathBuf,
    timeout: Duration,
    poll_interval: Duration,
}

impl FileLock {
    /// Lock guarding `target`, failing after `timeout`.
    pub fn for_target(target: &Path, timeout: Duration) -> Self {
        Self {
            path: lock_path_for(target),
            timeout,
            poll_interval: Duration::from_millis(DEFAULT_LOCK_POLL_INTERVAL_MS),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Path of the lock file itself.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `f` while holding the exclusive lock.
    ///
    /// The lock is released when `f` returns, including on error and on
    /// unwind, because the guard and file handle are dropped.
    pub fn with_exclusive<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<LockError>,
    {
        let mut lock = fd_lock::RwLock::new(self.open()?);
        let started = Instant::now();
        let mut contended = false;
        loop {
            match lock.try_write() {
                Ok(_guard) => return f(),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(self.io_error(&e).into()),
            }
            if !contended {
                contended = true;
                events::lock_contended(&self.path);
            }
            self.wait_or_time_out(started)?;
        }
    }

    /// Run `f` while holding a shared lock. Writers are excluded, readers are not.
    pub fn with_shared<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<LockError>,
    {
        let lock = fd_lock::RwLock::new(self.open()?);
        let started = Instant::now();
        loop {
            match lock.try_read() {
                Ok(_guard) => return f(),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(self.io_error(&e).into()),
            }
            self.wait_or_time_out(started)?;
        }
    }

    fn open(&self) -> Result<fs::File, LockError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(&e))?;
        }
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io_error(&e))
    }

    fn wait_or_time_out(&self, started: Instant) -> Result<(), LockError> {
        let waited = started.elapsed();
        if waited >= self.timeout {
            return Err(LockError::Timeout {
                path: self.path.display().to_string(),
                waited_ms: waited.as_millis() as u64,
            });
        }
        thread::sleep(self.poll_interval.min(self.timeout - waited));
        Ok(())
    }

    fn io_error(&self, err: &io::Error) -> LockError {
        LockError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }
}
