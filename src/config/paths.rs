//! Config file location and symlink checks.

use dirs::config_dir;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CONFIG_ENV;

/// Where the config file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// `--config PATH`; must exist.
    Flag(PathBuf),
    /// `$BUCKET_COPY_CONFIG`; must exist.
    Env(PathBuf),
    /// OS config dir; optional.
    Default(PathBuf),
    /// No config dir could be determined.
    None,
}

impl ConfigLocation {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigLocation::Flag(p) | ConfigLocation::Env(p) | ConfigLocation::Default(p) => {
                Some(p)
            }
            ConfigLocation::None => None,
        }
    }

    /// Explicit locations are an error when missing; the default one is not.
    pub fn is_explicit(&self) -> bool {
        matches!(self, ConfigLocation::Flag(_) | ConfigLocation::Env(_))
    }
}

/// Resolve the config file: `--config` > `$BUCKET_COPY_CONFIG` > OS default.
pub fn resolve_config_path(flag: Option<&Path>) -> ConfigLocation {
    if let Some(p) = flag {
        return ConfigLocation::Flag(p.to_path_buf());
    }
    if let Some(p) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return ConfigLocation::Env(PathBuf::from(p));
    }
    match default_config_path() {
        Some(p) => ConfigLocation::Default(p),
        None => ConfigLocation::None,
    }
}

/// OS-appropriate default config path.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(mut base) = config_dir() {
        base.push("bucket_copy");
        base.push("config.xml");
        Some(base)
    } else {
        std::env::var("HOME").ok().map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join("bucket_copy")
                .join("config.xml")
        })
    }
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
