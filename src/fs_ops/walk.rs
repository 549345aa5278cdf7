//! Source tree traversal.
//! Lazily yields every non-directory entry below the source root.
//!
//! Notes:
//! - Without `follow_symlinks`, symlinked directories are neither descended into nor
//!   yielded; symlinked files are yielded (the copier reads through them).
//! - With `follow_symlinks`, walkdir detects loops and reports them as errors.
//! - An optional `prune` directory (the destination, when it lives inside the source)
//!   is never entered.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One item produced by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovered {
    /// A candidate file (regular file, symlink to one, or special file).
    File(PathBuf),
    /// A part of the tree could not be read; the walk continues past it.
    Unreadable { path: PathBuf, message: String },
}

/// Build the traversal iterator for `root`.
pub fn walk_files(
    root: &Path,
    follow_symlinks: bool,
    prune: Option<PathBuf>,
) -> impl Iterator<Item = Discovered> + use<> {
    let root_owned = root.to_path_buf();
    WalkDir::new(root)
        .follow_links(follow_symlinks)
        .min_depth(1)
        .into_iter()
        .filter_entry(move |e| !is_pruned(e, prune.as_deref()))
        .filter_map(move |res| match res {
            Ok(entry) => {
                if entry.file_type().is_dir() {
                    return None;
                }
                // Not followed by walkdir, but still a directory behind a link.
                if entry.path_is_symlink() && !follow_symlinks && entry.path().is_dir() {
                    return None;
                }
                Some(Discovered::File(entry.into_path()))
            }
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root_owned.clone());
                let message = match e.loop_ancestor() {
                    Some(ancestor) => format!("symlink loop back to {}", ancestor.display()),
                    None => e.to_string(),
                };
                Some(Discovered::Unreadable { path, message })
            }
        })
}

/// Compute the path to prune so a destination nested inside the source is skipped.
/// Both paths must exist. Returns the destination spelled relative to `source` as given.
pub fn nested_destination(source: &Path, destination: &Path) -> Option<PathBuf> {
    let src_real = dunce::canonicalize(source).ok()?;
    let dst_real = dunce::canonicalize(destination).ok()?;
    let rel = dst_real.strip_prefix(&src_real).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(source.join(rel))
}

fn is_pruned(entry: &DirEntry, prune: Option<&Path>) -> bool {
    match prune {
        Some(p) => entry.file_type().is_dir() && entry.path() == p,
        None => false,
    }
}
