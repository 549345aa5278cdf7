//! I/O helper utilities.
//!
//! Provides small adapters to enrich io::Error with actionable context/hints,
//! usable with map_err in the copier and in the dispatcher pre-flight.
//!
//! Usage:
//!   // in functions returning Result<_, BucketCopyError>
//!   fs::create_dir_all(dir).map_err(copy_error_with_help("create bucket", dir, src))?;

use std::io;
use std::path::Path;

use crate::errors::BucketCopyError;

/// Format a human-friendly message with op/path plus platform-aware hints.
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str(" (permission denied; check ownership and read/write permissions)");
                }
                libc::ENOENT => {
                    msg.push_str(" (path not found; it may have been removed during the run)");
                }
                libc::EEXIST => {
                    msg.push_str(" (already exists)");
                }
                libc::ENOSPC => {
                    msg.push_str(" (insufficient space on device)");
                }
                libc::EROFS => {
                    msg.push_str(" (read-only filesystem; cannot write here)");
                }
                libc::ELOOP => {
                    msg.push_str(" (too many symbolic link levels; possible symlink cycle)");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str(" (filename or path too long)");
                }
                libc::EMFILE => {
                    msg.push_str(" (process file descriptor limit reached; lower --concurrency)");
                }
                libc::EISDIR => {
                    msg.push_str(" (is a directory)");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                5 => msg.push_str(" (access denied; check permissions)"),
                32 => msg.push_str(" (sharing violation; file is in use)"),
                2 | 3 => msg.push_str(" (path not found)"),
                80 => msg.push_str(" (already exists)"),
                112 => msg.push_str(" (insufficient disk space)"),
                19 => msg.push_str(" (write protected media)"),
                206 => msg.push_str(" (filename or path too long)"),
                4 => msg.push_str(" (too many open files; lower --concurrency)"),
                _ => {}
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str(" (permission denied; check ownership and read/write permissions)");
            }
            io::ErrorKind::NotFound => {
                msg.push_str(" (path not found; it may have been removed during the run)");
            }
            io::ErrorKind::AlreadyExists => {
                msg.push_str(" (already exists)");
            }
            _ => {}
        }
    }

    msg
}

/// Adapter for per-file copy code.
/// Returns a closure suitable for `.map_err(...)` that tags the failure with the
/// source file being processed while describing the path the operation touched.
pub fn copy_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
    src: &'a Path,
) -> impl FnOnce(io::Error) -> BucketCopyError + 'a {
    move |e: io::Error| BucketCopyError::Copy {
        path: src.to_path_buf(),
        message: describe_io_error(op, path, &e),
    }
}
