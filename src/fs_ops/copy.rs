//! Single-file copy into an extension bucket.
//! - Classifies the source, skipping anything that is not a regular file
//! - Ensures `<dest_root>/<bucket>` exists (idempotent under concurrent creation)
//! - Claims a collision-free name with exclusive create, then streams bytes into it
//! - Preserves timestamps/permissions; removes the claimed file if the copy fails

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::classify::{bucket_name, entry_kind, EntryKind};
use super::helpers::copy_error_with_help;
use super::io_copy::{copy_into, DurabilityMode};
use super::{metadata, resolve};
use crate::errors::BucketCopyError;

/// Why a source was not copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Directory,
    NotRegular,
    Vanished,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Directory => "directory",
            SkipReason::NotRegular => "not a regular file",
            SkipReason::Vanished => "vanished",
        }
    }
}

/// Outcome of one successful copier call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied { dest: PathBuf, bytes: u64 },
    Skipped(SkipReason),
}

/// Options for [`copy_into_bucket`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    pub durability: DurabilityMode,
}

/// Copy `src` into `<dest_root>/<bucket>/`, never overwriting an existing file.
pub fn copy_into_bucket(
    src: &Path,
    dest_root: &Path,
    opts: CopyOptions,
) -> Result<CopyOutcome, BucketCopyError> {
    match entry_kind(src) {
        EntryKind::File => {}
        EntryKind::Directory => {
            debug!(src = %src.display(), "skip: directory");
            return Ok(CopyOutcome::Skipped(SkipReason::Directory));
        }
        EntryKind::Other => {
            debug!(src = %src.display(), "skip: not a regular file");
            return Ok(CopyOutcome::Skipped(SkipReason::NotRegular));
        }
        EntryKind::Missing => {
            debug!(src = %src.display(), "skip: vanished before copy");
            return Ok(CopyOutcome::Skipped(SkipReason::Vanished));
        }
    }

    let file_name = src.file_name().ok_or_else(|| BucketCopyError::Copy {
        path: src.to_path_buf(),
        message: "source has no file name".into(),
    })?;

    let bucket = bucket_name(src);
    let bucket_dir = dest_root.join(&bucket);
    fs::create_dir_all(&bucket_dir)
        .map_err(copy_error_with_help("create bucket directory", &bucket_dir, src))?;

    let desired = bucket_dir.join(file_name);
    let (dest, dst_f) = resolve::claim_unique(&desired).map_err(claim_error(&desired, src))?;
    if dest != desired {
        trace!(src = %src.display(), dest = %dest.display(), "destination name taken; using numbered variant");
    }

    match write_claimed(src, &dest, dst_f, opts) {
        Ok(bytes) => {
            debug!(src = %src.display(), dest = %dest.display(), bucket = %bucket, bytes, "copied");
            Ok(CopyOutcome::Copied { dest, bytes })
        }
        Err(e) => {
            // The claimed name holds a partial copy; drop it so no truncated file remains.
            if let Err(rm) = fs::remove_file(&dest) {
                warn!(dest = %dest.display(), error = %rm, "failed to remove partial copy");
            }
            Err(e)
        }
    }
}

// claim_unique only reports AlreadyExists once every numbered variant is taken.
fn claim_error<'a>(
    desired: &'a Path,
    src: &'a Path,
) -> impl FnOnce(io::Error) -> BucketCopyError + 'a {
    move |e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            BucketCopyError::NamesExhausted(desired.to_path_buf())
        } else {
            copy_error_with_help("claim destination name", desired, src)(e)
        }
    }
}

fn write_claimed(
    src: &Path,
    dest: &Path,
    dst_f: fs::File,
    opts: CopyOptions,
) -> Result<u64, BucketCopyError> {
    let src_meta = fs::metadata(src).map_err(copy_error_with_help("stat source", src, src))?;
    let res = copy_into(src, dst_f, opts.durability)
        .map_err(copy_error_with_help("copy to destination", dest, src))?;
    metadata::preserve_metadata(dest, &src_meta);
    metadata::preserve_xattrs(src, dest);
    Ok(res.bytes)
}
