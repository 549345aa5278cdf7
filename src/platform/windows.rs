//! Non-Unix implementations of platform helpers (best-effort).
//! Windows lacks POSIX mode semantics; no ACL management is attempted.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Open log file for appending (no symlink defense available via std here).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}
