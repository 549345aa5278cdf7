//! Unique-name resolution for destination files.
//!
//! Naming: the requested name first, then "stem (1).ext", "stem (2).ext", ...
//! Stem and extension split at the last dot:
//! - "movie.mkv" -> "movie (1).mkv"
//! - ".env" -> ".env (1)"
//! - "archive.tar.gz" -> "archive.tar (1).gz"
//!
//! Two entry points:
//! - `unique_destination` only inspects the filesystem (check-then-decide). Another
//!   writer may take the returned name before the caller creates it.
//! - `claim_unique` creates the file with O_EXCL semantics, so the returned name is
//!   owned by the caller. The copier uses this one.

use std::ffi::{OsStr, OsString};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::errors::BucketCopyError;

/// Give up after this many numbered variants.
pub const MAX_TRIES: u64 = 10_000;

// Conservative filename limits (bytes/characters, platform-specific and approximate).
#[cfg(windows)]
const MAX_FILENAME_LEN: usize = 240;
#[cfg(not(windows))]
const MAX_FILENAME_LEN: usize = 255;

/// Return `desired` if nothing exists there, else the first free numbered variant.
pub fn unique_destination(desired: &Path) -> Result<PathBuf, BucketCopyError> {
    if !exists_no_follow(desired) {
        return Ok(desired.to_path_buf());
    }
    let (dir, stem, ext) = split_target(desired);
    for n in 1..=MAX_TRIES {
        let candidate = dir.join(numbered_name(&stem, ext.as_deref(), n));
        if !exists_no_follow(&candidate) {
            return Ok(candidate);
        }
    }
    Err(BucketCopyError::NamesExhausted(desired.to_path_buf()))
}

/// Atomically create the first free name among `desired` and its numbered variants.
/// Returns the created path together with the open (empty) file.
///
/// Fails with `AlreadyExists` only when every variant up to [`MAX_TRIES`] is taken;
/// any other I/O error is returned as-is.
pub fn claim_unique(desired: &Path) -> io::Result<(PathBuf, File)> {
    match create_exclusive(desired) {
        Ok(f) => return Ok((desired.to_path_buf(), f)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(e),
    }

    let (dir, stem, ext) = split_target(desired);
    let mut collisions = 0u32;
    for n in 1..=MAX_TRIES {
        let candidate = dir.join(numbered_name(&stem, ext.as_deref(), n));
        match create_exclusive(&candidate) {
            Ok(f) => return Ok((candidate, f)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                collisions = collisions.saturating_add(1);
                if collisions == 3 {
                    trace!(dest = %desired.display(), "resolve: multiple collisions, continuing to search a free suffix");
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name after {MAX_TRIES} attempts"),
    ))
}

fn create_exclusive(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// Existence check that does not follow symlinks: a dangling link still occupies the name.
fn exists_no_follow(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Split `path` into (parent dir, stem, extension) using last-dot rules.
/// A trailing dot ("name.") has no extension; the whole name is the stem.
fn split_target(path: &Path) -> (PathBuf, OsString, Option<OsString>) {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path.file_name().unwrap_or_else(|| OsStr::new("file"));
    let as_path = Path::new(name);
    match (as_path.file_stem(), as_path.extension()) {
        (Some(stem), Some(ext)) if !ext.is_empty() => {
            (dir, stem.to_os_string(), Some(ext.to_os_string()))
        }
        _ => (dir, name.to_os_string(), None),
    }
}

fn numbered_name(stem: &OsStr, ext: Option<&OsStr>, n: u64) -> OsString {
    build_name_with_suffix(stem, ext, &format!(" ({n})"))
}

/// Measure the approximate length of an OsStr for filename budgeting.
#[cfg(unix)]
fn name_len_units(s: &OsStr) -> usize {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().len()
}

#[cfg(not(unix))]
fn name_len_units(s: &OsStr) -> usize {
    s.to_string_lossy().len()
}

/// Truncate the stem if needed so `stem + suffix + ["." + ext]` fits within MAX_FILENAME_LEN.
fn build_name_with_suffix(stem: &OsStr, ext: Option<&OsStr>, suffix: &str) -> OsString {
    let mut overhead = name_len_units(OsStr::new(suffix));
    let mut ext_part = OsString::new();
    if let Some(e) = ext {
        overhead = overhead.saturating_add(1 + name_len_units(e));
        ext_part.push(".");
        ext_part.push(e);
    }

    let mut stem_os = stem.to_os_string();
    if name_len_units(&stem_os) + overhead > MAX_FILENAME_LEN {
        let budget = MAX_FILENAME_LEN.saturating_sub(overhead).max(1);
        stem_os = truncate_stem(stem, budget);
    }

    let mut new_name = OsString::new();
    new_name.push(&stem_os);
    new_name.push(suffix);
    new_name.push(&ext_part);
    new_name
}

fn truncate_stem(stem: &OsStr, budget: usize) -> OsString {
    if let Some(stem_str) = stem.to_str() {
        let mut acc = String::new();
        for ch in stem_str.chars() {
            if acc.len() + ch.len_utf8() > budget {
                break;
            }
            acc.push(ch);
        }
        if acc.is_empty() {
            acc.push('f');
        }
        return OsString::from(acc);
    }
    #[cfg(unix)]
    {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};
        let bytes = stem.as_bytes();
        OsString::from_vec(bytes[..bytes.len().min(budget)].to_vec())
    }
    #[cfg(not(unix))]
    {
        let lossy = stem.to_string_lossy().into_owned();
        truncate_stem(OsStr::new(&lossy), budget)
    }
}
