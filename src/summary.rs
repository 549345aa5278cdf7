//! Run summary model and its concurrent accumulator.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// One failed unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Source file that could not be copied.
    pub path: PathBuf,
    /// User-facing error text.
    pub message: String,
}

/// Aggregate counters for one run.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    /// Files handed to the worker pool.
    pub found: u64,
    /// Files written into a bucket.
    pub copied: u64,
    /// Scheduled files the copier declined (directories, special files, paths that vanished mid-run).
    pub skipped: u64,
    /// Paths that disappeared between discovery and scheduling.
    pub vanished: u64,
    /// Scheduled files never started because the run was cancelled.
    pub cancelled: u64,
    /// Total bytes written.
    pub bytes: u64,
    /// Non-fatal traversal problems (unreadable directories, symlink loops).
    pub warnings: Vec<String>,
    /// Per-file failures.
    pub failures: Vec<FileFailure>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Units that ran to an outcome: copied, skipped or failed.
    pub fn processed(&self) -> u64 {
        self.copied + self.skipped + self.failures.len() as u64
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "found={} processed={} copied={} skipped={} failed={} vanished={} cancelled={} bytes={} elapsed={:.2}s",
            self.found,
            self.processed(),
            self.copied,
            self.skipped,
            self.failures.len(),
            self.vanished,
            self.cancelled,
            self.bytes,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Thread-safe accumulator shared by all units of one run.
#[derive(Debug, Default)]
pub(crate) struct SummaryBuilder {
    inner: Mutex<RunSummary>,
}

impl SummaryBuilder {
    fn with<F: FnOnce(&mut RunSummary)>(&self, f: F) {
        // A panicking unit cannot leave the counters half-updated, so a poisoned lock is still usable.
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut guard);
    }

    pub(crate) fn add_found(&self) {
        self.with(|s| s.found += 1);
    }

    pub(crate) fn add_vanished(&self) {
        self.with(|s| s.vanished += 1);
    }

    pub(crate) fn add_warning(&self, msg: String) {
        self.with(|s| s.warnings.push(msg));
    }

    pub(crate) fn add_copied(&self, bytes: u64) {
        self.with(|s| {
            s.copied += 1;
            s.bytes += bytes;
        });
    }

    pub(crate) fn add_skipped(&self) {
        self.with(|s| s.skipped += 1);
    }

    pub(crate) fn add_cancelled(&self) {
        self.with(|s| s.cancelled += 1);
    }

    pub(crate) fn add_failure(&self, path: PathBuf, message: String) {
        self.with(|s| s.failures.push(FileFailure { path, message }));
    }

    pub(crate) fn finish(self, elapsed: Duration) -> RunSummary {
        let mut summary = self.inner.into_inner().unwrap_or_else(|p| p.into_inner());
        summary.elapsed = elapsed;
        summary.failures.sort_by(|a, b| a.path.cmp(&b.path));
        summary
    }
}
