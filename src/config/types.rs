//! Core configuration types.
//! - Config holds the run tunables with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::dispatch::{default_concurrency, RunOptions};
use crate::fs_ops::DurabilityMode;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Warnings and errors (default)
    #[default]
    Normal,
    /// Plus progress
    Info,
    /// Plus per-file trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" | "warn" | "warning" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Map a `-v` count: 0 = warnings+errors, 1 = + info, 2+ = + debug.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Normal,
            1 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Tunables shared by every run. Source and destination come from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum simultaneous copies
    pub concurrency: usize,
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Flush every copy to stable storage
    pub fsync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            follow_symlinks: false,
            log_level: LogLevel::Normal,
            log_file: None,
            fsync: false,
        }
    }
}

impl Config {
    /// Build the dispatcher options for one source/destination pair.
    pub fn run_options(&self, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> RunOptions {
        let mut opts = RunOptions::new(source, destination);
        opts.concurrency = self.concurrency.max(1);
        opts.follow_symlinks = self.follow_symlinks;
        opts.durability = if self.fsync {
            DurabilityMode::Full
        } else {
            DurabilityMode::Data
        };
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_mapping() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Normal);
        assert_eq!(LogLevel::from_verbosity(1), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(2), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(9), LogLevel::Debug);
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(LogLevel::parse(" DEBUG "), Some(LogLevel::Debug));
        assert_eq!("quiet".parse::<LogLevel>(), Ok(LogLevel::Quiet));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn run_options_follow_config() {
        let cfg = Config {
            concurrency: 0,
            follow_symlinks: true,
            fsync: true,
            ..Config::default()
        };
        let opts = cfg.run_options("/src", "/dst");
        assert_eq!(opts.concurrency, 1);
        assert!(opts.follow_symlinks);
        assert_eq!(opts.durability, DurabilityMode::Full);
    }
}
