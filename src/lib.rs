//! Core library for `bucket_copy`.
//!
//! Copies every regular file of a source tree into `destination/<extension>/`
//! (or `destination/no_extension/`), running at most N copies at once and
//! never overwriting an existing file. A failing file is recorded in the run
//! summary and never stops its siblings.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary (or to the embedding application).
//!
//! ```no_run
//! use bucket_copy::{organize, RunOptions};
//!
//! let mut opts = RunOptions::new("/data/inbox", "/data/sorted");
//! opts.concurrency = 4;
//! let summary = organize(&opts)?;
//! println!("{summary}");
//! # Ok::<(), bucket_copy::BucketCopyError>(())
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;
pub mod shutdown;
pub mod summary;

pub use config::{
    default_config_path, load_config, load_config_from_xml_path, path_has_symlink_ancestor,
    validate_and_normalize, Config, LogLevel,
};
pub use dispatch::{
    default_concurrency, organize, BucketCopier, Dispatcher, FileCopier, RunOptions,
};
pub use errors::BucketCopyError;
pub use fs_ops::{
    bucket_name, claim_unique, copy_into_bucket, entry_kind, unique_destination, walk_files,
    CopyOptions, CopyOutcome, Discovered, DurabilityMode, EntryKind, SkipReason, NO_EXTENSION,
};
pub use summary::{FileFailure, RunSummary};
