//! Path classification.
//! - `bucket_name` maps a file name to its extension bucket.
//! - `entry_kind` reports what a path currently is (following symlinks).

use std::fs;
use std::io;
use std::path::Path;

/// Bucket used for files without a usable extension.
pub const NO_EXTENSION: &str = "no_extension";

/// What a path points at right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Sockets, fifos, device nodes.
    Other,
    /// Nothing there, or a symlink whose target is gone.
    Missing,
}

/// Bucket directory name for `path`: the lowercased text after the last '.'
/// of the file name, or [`NO_EXTENSION`].
///
/// Examples:
/// - "photo.JPG" -> "jpg"
/// - "archive.tar.gz" -> "gz"
/// - ".env", "README", "trailing." -> "no_extension"
pub fn bucket_name(path: &Path) -> String {
    match path.extension() {
        Some(ext) if !ext.is_empty() => ext.to_string_lossy().to_lowercase(),
        _ => NO_EXTENSION.to_string(),
    }
}

/// Classify `path`, following symlinks.
pub fn entry_kind(path: &Path) -> EntryKind {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => EntryKind::File,
        Ok(meta) if meta.is_dir() => EntryKind::Directory,
        Ok(_) => EntryKind::Other,
        Err(e) if e.kind() == io::ErrorKind::NotFound => EntryKind::Missing,
        Err(_) => EntryKind::Other,
    }
}
