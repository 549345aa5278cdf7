//! Bounded work dispatcher.
//!
//! Walks the source tree and submits one unit of work per discovered file to a
//! dedicated worker pool sized to the concurrency ceiling, so at most N copies run
//! at any instant. Units are spawned into a structured scope that only returns once
//! every unit has reported, and each unit's failure (or panic) is recorded in the
//! summary without affecting its siblings.
//!
//! Cancellation is cooperative: once requested (process-wide via `shutdown`, or
//! per run via `with_cancel`) no further files are scheduled, queued units record
//! themselves as cancelled, and in-flight copies finish normally.

use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::errors::BucketCopyError;
use crate::fs_ops::helpers::describe_io_error;
use crate::fs_ops::{
    copy_into_bucket, entry_kind, nested_destination, walk_files, CopyOptions, CopyOutcome,
    Discovered, DurabilityMode, EntryKind,
};
use crate::shutdown;
use crate::summary::{RunSummary, SummaryBuilder};

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Maximum simultaneous copies; values below 1 are treated as 1.
    pub concurrency: usize,
    pub follow_symlinks: bool,
    pub durability: DurabilityMode,
}

impl RunOptions {
    /// Options with default concurrency, no symlink following and page-cache durability.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            concurrency: default_concurrency(),
            follow_symlinks: false,
            durability: DurabilityMode::Data,
        }
    }

    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

/// The host's available parallelism (8 if it cannot be determined).
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(8)
}

/// The per-file step executed by each unit of work.
pub trait FileCopier: Sync {
    fn copy_file(&self, src: &Path, dest_root: &Path) -> Result<CopyOutcome, BucketCopyError>;
}

/// Production copier: classify, claim a unique name, stream bytes, keep metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct BucketCopier {
    pub opts: CopyOptions,
}

impl FileCopier for BucketCopier {
    fn copy_file(&self, src: &Path, dest_root: &Path) -> Result<CopyOutcome, BucketCopyError> {
        copy_into_bucket(src, dest_root, self.opts)
    }
}

/// Runs one organize pass.
pub struct Dispatcher<C = BucketCopier> {
    opts: RunOptions,
    copier: C,
    cancel: Option<Arc<AtomicBool>>,
}

impl Dispatcher<BucketCopier> {
    pub fn new(opts: RunOptions) -> Self {
        let copier = BucketCopier {
            opts: CopyOptions {
                durability: opts.durability,
            },
        };
        Self {
            opts,
            copier,
            cancel: None,
        }
    }
}

impl<C: FileCopier> Dispatcher<C> {
    /// Replace the per-file copier.
    pub fn with_copier<D: FileCopier>(self, copier: D) -> Dispatcher<D> {
        Dispatcher {
            opts: self.opts,
            copier,
            cancel: self.cancel,
        }
    }

    /// Attach a cancel flag for this run only.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Execute the run. Only configuration errors are returned as `Err`; every
    /// per-file problem ends up in the summary.
    pub fn run(&self) -> Result<RunSummary, BucketCopyError> {
        let started = Instant::now();
        self.preflight()?;

        let concurrency = self.opts.effective_concurrency();
        info!(
            source = %self.opts.source.display(),
            dest = %self.opts.destination.display(),
            concurrency,
            follow_symlinks = self.opts.follow_symlinks,
            "starting run"
        );

        let builder = SummaryBuilder::default();
        match build_pool(concurrency) {
            Some(pool) => {
                let builder = &builder;
                pool.in_place_scope(|scope| {
                    self.enumerate(builder, |path| {
                        scope.spawn(move |_| self.run_unit(&path, builder));
                    });
                });
            }
            None => {
                self.enumerate(&builder, |path| self.run_unit(&path, &builder));
            }
        }

        let summary = builder.finish(started.elapsed());
        if summary.found == 0 && summary.vanished == 0 {
            info!(source = %self.opts.source.display(), "no files found");
        }
        if summary.was_cancelled() || self.cancelled() {
            warn!(cancelled = summary.cancelled, "run cancelled before all files were processed");
        }
        if !summary.failures.is_empty() {
            warn!(failed = summary.failures.len(), "some files could not be copied");
        }
        info!(
            found = summary.found,
            processed = summary.processed(),
            copied = summary.copied,
            skipped = summary.skipped,
            failed = summary.failures.len(),
            bytes = summary.bytes,
            "run complete"
        );
        Ok(summary)
    }

    /// Validate the source root and create the destination root.
    fn preflight(&self) -> Result<(), BucketCopyError> {
        let src = &self.opts.source;
        let dest = &self.opts.destination;

        match fs::metadata(src) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(BucketCopyError::SourceNotDirectory(src.clone())),
            Err(_) => return Err(BucketCopyError::SourceNotFound(src.clone())),
        }

        match fs::metadata(dest) {
            Ok(meta) if !meta.is_dir() => {
                return Err(BucketCopyError::DestinationNotDirectory(dest.clone()));
            }
            Ok(_) => {
                if same_directory(src, dest) {
                    return Err(BucketCopyError::SourceIsDestination(dest.clone()));
                }
            }
            Err(_) => {
                fs::create_dir_all(dest).map_err(|e| BucketCopyError::DestinationCreate {
                    path: dest.clone(),
                    message: describe_io_error("create destination", dest, &e),
                })?;
                debug!(dest = %dest.display(), "created destination root");
            }
        }
        Ok(())
    }

    fn enumerate<F: FnMut(PathBuf)>(&self, builder: &SummaryBuilder, mut schedule: F) {
        let prune = nested_destination(&self.opts.source, &self.opts.destination);
        if let Some(p) = &prune {
            debug!(path = %p.display(), "destination is inside source; excluding it from the walk");
        }

        for item in walk_files(&self.opts.source, self.opts.follow_symlinks, prune) {
            if self.cancelled() {
                warn!("cancellation requested; no further files will be scheduled");
                break;
            }
            match item {
                Discovered::Unreadable { path, message } => {
                    warn!(path = %path.display(), error = %message, "skipping unreadable part of the source tree");
                    builder.add_warning(format!("{}: {}", path.display(), message));
                }
                Discovered::File(path) => {
                    if entry_kind(&path) == EntryKind::Missing {
                        warn!(src = %path.display(), "skip: vanished before scheduling");
                        builder.add_vanished();
                        continue;
                    }
                    builder.add_found();
                    schedule(path);
                }
            }
        }
    }

    fn run_unit(&self, src: &Path, builder: &SummaryBuilder) {
        if self.cancelled() {
            debug!(src = %src.display(), "cancelled before start");
            builder.add_cancelled();
            return;
        }

        let dest_root = &self.opts.destination;
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.copier.copy_file(src, dest_root)));
        match result {
            Ok(Ok(CopyOutcome::Copied { bytes, .. })) => builder.add_copied(bytes),
            Ok(Ok(CopyOutcome::Skipped(reason))) => {
                debug!(src = %src.display(), reason = reason.as_str(), "skipped");
                builder.add_skipped();
            }
            Ok(Err(e)) => {
                error!(src = %src.display(), code = e.code(), kind = e.kind(), error = %e, "copy failed");
                builder.add_failure(src.to_path_buf(), e.to_string());
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                error!(src = %src.display(), error = %msg, "copy panicked");
                builder.add_failure(src.to_path_buf(), format!("copy panicked: {msg}"));
            }
        }
    }

    fn cancelled(&self) -> bool {
        shutdown::is_requested()
            || self
                .cancel
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Organize `opts.source` into `opts.destination` with the default copier.
pub fn organize(opts: &RunOptions) -> Result<RunSummary, BucketCopyError> {
    Dispatcher::new(opts.clone()).run()
}

fn build_pool(concurrency: usize) -> Option<ThreadPool> {
    match ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .thread_name(|i| format!("bucket-copy-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(concurrency, error = %e, "failed to start worker pool; copying serially");
            None
        }
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn populate(root: &assert_fs::TempDir, n: usize) {
        for i in 0..n {
            root.child(format!("src/f{i:03}.dat")).write_str("x").unwrap();
        }
    }

    fn opts(root: &assert_fs::TempDir, concurrency: usize) -> RunOptions {
        let mut o = RunOptions::new(root.path().join("src"), root.path().join("out"));
        o.concurrency = concurrency;
        o
    }

    /// Tracks how many copies are in flight at once.
    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FileCopier for Gauge {
        fn copy_file(&self, src: &Path, dest_root: &Path) -> Result<CopyOutcome, BucketCopyError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(15));
            let res = BucketCopier::default().copy_file(src, dest_root);
            self.current.fetch_sub(1, Ordering::SeqCst);
            res
        }
    }

    #[test]
    fn never_exceeds_concurrency_ceiling() {
        let temp = assert_fs::TempDir::new().unwrap();
        populate(&temp, 30);
        let gauge = Gauge::default();
        let dispatcher = Dispatcher::new(opts(&temp, 3)).with_copier(gauge);
        let summary = dispatcher.run().unwrap();

        assert_eq!(summary.found, 30);
        assert_eq!(summary.copied, 30);
        let peak = dispatcher.copier.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency {peak} exceeded ceiling");
        assert!(peak >= 1);
    }

    #[test]
    fn zero_concurrency_is_clamped_to_one() {
        let temp = assert_fs::TempDir::new().unwrap();
        populate(&temp, 5);
        let dispatcher = Dispatcher::new(opts(&temp, 0)).with_copier(Gauge::default());
        let summary = dispatcher.run().unwrap();
        assert_eq!(summary.copied, 5);
        assert_eq!(dispatcher.copier.peak.load(Ordering::SeqCst), 1);
    }

    struct FailOn(&'static str);

    impl FileCopier for FailOn {
        fn copy_file(&self, src: &Path, dest_root: &Path) -> Result<CopyOutcome, BucketCopyError> {
            if src.file_name().is_some_and(|n| n.to_string_lossy().contains(self.0)) {
                return Err(BucketCopyError::Copy {
                    path: src.to_path_buf(),
                    message: "injected".into(),
                });
            }
            BucketCopier::default().copy_file(src, dest_root)
        }
    }

    #[test]
    fn failures_are_isolated_and_counted() {
        let temp = assert_fs::TempDir::new().unwrap();
        populate(&temp, 10);
        temp.child("src/bad_one.txt").write_str("x").unwrap();
        temp.child("src/bad_two.txt").write_str("x").unwrap();

        let summary = Dispatcher::new(opts(&temp, 4))
            .with_copier(FailOn("bad_"))
            .run()
            .unwrap();
        assert_eq!(summary.found, 12);
        assert_eq!(summary.copied, 10);
        assert_eq!(summary.failure_count(), 2);
        assert_eq!(summary.processed(), 12);
        assert!(summary.failures[0].path.ends_with("bad_one.txt"));
        assert!(summary.failures[1].path.ends_with("bad_two.txt"));
        assert_eq!(std::fs::read_dir(temp.path().join("out/dat")).unwrap().count(), 10);
    }

    struct PanicOn(&'static str);

    impl FileCopier for PanicOn {
        fn copy_file(&self, src: &Path, dest_root: &Path) -> Result<CopyOutcome, BucketCopyError> {
            if src.file_name().is_some_and(|n| n.to_string_lossy().contains(self.0)) {
                panic!("unit blew up");
            }
            BucketCopier::default().copy_file(src, dest_root)
        }
    }

    #[test]
    fn panicking_unit_is_recorded_as_failure() {
        let temp = assert_fs::TempDir::new().unwrap();
        populate(&temp, 6);
        temp.child("src/boom.bin").write_str("x").unwrap();

        let summary = Dispatcher::new(opts(&temp, 2))
            .with_copier(PanicOn("boom"))
            .run()
            .unwrap();
        assert_eq!(summary.copied, 6);
        assert_eq!(summary.failure_count(), 1);
        assert!(summary.failures[0].message.contains("unit blew up"));
    }

    struct CancelAfterFirst(Arc<AtomicBool>);

    impl FileCopier for CancelAfterFirst {
        fn copy_file(&self, src: &Path, dest_root: &Path) -> Result<CopyOutcome, BucketCopyError> {
            self.0.store(true, Ordering::SeqCst);
            BucketCopier::default().copy_file(src, dest_root)
        }
    }

    #[test]
    fn cancellation_stops_new_work_and_accounts_for_queued_units() {
        let temp = assert_fs::TempDir::new().unwrap();
        populate(&temp, 50);
        let flag = Arc::new(AtomicBool::new(false));

        let summary = Dispatcher::new(opts(&temp, 1))
            .with_copier(CancelAfterFirst(flag.clone()))
            .with_cancel(flag)
            .run()
            .unwrap();
        assert!(summary.copied >= 1);
        assert_eq!(summary.copied + summary.cancelled, summary.found);
        assert!(summary.failures.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_links_count_as_vanished_and_special_files_as_skipped() {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;
        let temp = assert_fs::TempDir::new().unwrap();
        populate(&temp, 1);
        let src = temp.path().join("src");
        std::os::unix::fs::symlink(src.join("gone-target"), src.join("broken.txt")).unwrap();
        let fifo = CString::new(src.join("pipe.fifo").as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { libc::mkfifo(fifo.as_ptr(), 0o644) }, 0);

        let summary = organize(&opts(&temp, 2)).unwrap();
        assert_eq!(summary.vanished, 1);
        assert_eq!(summary.found, 2);
        assert_eq!(summary.copied, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failure_count(), 0);
        assert!(!temp.path().join("out/txt").exists());
        assert!(!temp.path().join("out/fifo").exists());
    }

    #[test]
    fn missing_source_is_a_configuration_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = organize(&opts(&temp, 2)).unwrap_err();
        assert!(matches!(err, BucketCopyError::SourceNotFound(_)));
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn source_equal_to_destination_is_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        populate(&temp, 1);
        let o = RunOptions::new(temp.path().join("src"), temp.path().join("src"));
        let err = organize(&o).unwrap_err();
        assert!(matches!(err, BucketCopyError::SourceIsDestination(_)));
    }

    #[test]
    fn destination_that_is_a_file_is_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        populate(&temp, 1);
        temp.child("out").write_str("not a dir").unwrap();
        let err = organize(&opts(&temp, 1)).unwrap_err();
        assert!(matches!(err, BucketCopyError::DestinationNotDirectory(_)));
    }
}
