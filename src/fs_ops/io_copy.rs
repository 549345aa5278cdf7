//! Streaming copy into an already-claimed destination file.
//!
//! Features:
//! - Destination is a file handle obtained via exclusive create; we never open by name here.
//! - Linux: in-kernel `copy_file_range` fast path, falling back to buffered streaming.
//! - Buffered I/O with large (1 MiB) buffers to reduce syscall count.
//! - Optional full fsync for strong durability guarantees.
//!
//! Snapshot semantics: the source file is read once from start to EOF; if it grows
//! concurrently, the additional bytes are not included.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

const BUF_SIZE: usize = 1024 * 1024;

/// Durability mode controlling post-write flush behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// Ensure written data reaches the OS page cache (`flush`), but do not force
    /// a disk barrier.
    #[default]
    Data,
    /// Force data and metadata to stable storage (`sync_all`).
    Full,
}

/// Result of a streaming copy operation.
#[derive(Debug, Clone, Copy)]
pub struct CopyResult {
    /// Total bytes copied from source to destination.
    pub bytes: u64,
    /// Durability mode applied.
    pub mode: DurabilityMode,
}

/// Copy the contents of `src` into `dst_f` (which must be empty and writable).
pub(crate) fn copy_into(src: &Path, dst_f: File, mode: DurabilityMode) -> io::Result<CopyResult> {
    let src_f = File::open(src)?;

    #[cfg(target_os = "linux")]
    {
        use std::os::unix::io::AsRawFd;
        let mut total: u64 = 0;
        let chunk: usize = 16 * 1024 * 1024;
        loop {
            let rc = unsafe {
                libc::copy_file_range(
                    src_f.as_raw_fd(),
                    std::ptr::null_mut(),
                    dst_f.as_raw_fd(),
                    std::ptr::null_mut(),
                    chunk,
                    0,
                )
            };
            if rc > 0 {
                total += rc as u64;
                continue;
            }
            if rc == 0 {
                if mode == DurabilityMode::Full {
                    dst_f.sync_all()?;
                }
                return Ok(CopyResult { bytes: total, mode });
            }
            let err = io::Error::last_os_error();
            let unsupported = matches!(
                err.raw_os_error(),
                Some(code) if code == libc::EXDEV
                    || code == libc::ENOSYS
                    || code == libc::EINVAL
                    || code == libc::EPERM
                    || code == libc::EOPNOTSUPP
            );
            if total == 0 && unsupported {
                break;
            }
            return Err(err);
        }
    }

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;

    if mode == DurabilityMode::Full {
        writer.get_ref().sync_all()?;
    }

    Ok(CopyResult { bytes, mode })
}
