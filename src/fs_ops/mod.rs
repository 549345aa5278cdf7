//! Filesystem operations: classification, naming, copying and traversal.

mod classify;
mod copy;
pub mod helpers;
mod io_copy;
mod metadata;
mod resolve;
mod walk;

pub use classify::{bucket_name, entry_kind, EntryKind, NO_EXTENSION};
pub use copy::{copy_into_bucket, CopyOptions, CopyOutcome, SkipReason};
pub use io_copy::{CopyResult, DurabilityMode};
pub use metadata::{preserve_metadata, preserve_xattrs};
pub use resolve::{claim_unique, unique_destination, MAX_TRIES};
pub use walk::{nested_destination, walk_files, Discovered};
