//! Config validation: clamps out-of-range tunables and rejects unusable log paths.

use anyhow::{bail, Result};

use super::types::Config;

/// Normalize `cfg` in place. Concurrency below 1 becomes 1.
pub fn validate_and_normalize(cfg: &mut Config) -> Result<()> {
    if cfg.concurrency == 0 {
        cfg.concurrency = 1;
    }
    if let Some(lf) = &cfg.log_file {
        if lf.as_os_str().is_empty() {
            cfg.log_file = None;
        } else if lf.is_dir() {
            bail!("log_file points to a directory: {}", lf.display());
        }
    }
    Ok(())
}
