//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - `--log-level` takes precedence over `-v`.
//! - Source and destination are required unless `--print-config` is given.

use clap::{ArgAction, Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};

/// Copy every file of a directory tree into per-extension buckets.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Sort a directory tree into per-extension folders with bounded parallel copies"
)]
pub struct Args {
    /// Directory to read files from (never modified).
    #[arg(
        short = 's',
        long,
        value_name = "PATH",
        value_hint = ValueHint::DirPath,
        required_unless_present = "print_config"
    )]
    pub source: Option<PathBuf>,

    /// Directory receiving the extension buckets (created if missing).
    #[arg(
        short = 'o',
        long = "output",
        visible_alias = "destination",
        value_name = "PATH",
        value_hint = ValueHint::DirPath,
        required_unless_present = "print_config"
    )]
    pub output: Option<PathBuf>,

    /// Maximum number of simultaneous copies (minimum 1).
    #[arg(short = 'c', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Descend into symlinked directories.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Increase verbosity: -v for progress, -vv for per-file trace.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, value_name = "LEVEL", help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Also write logs to this file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Flush every copied file to stable storage before counting it as done.
    #[arg(long)]
    pub fsync: bool,

    /// Read settings from this XML file instead of the default location.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print which config file would be used, then exit.
    #[arg(long, help = "Print the config file location used by bucket_copy and exit")]
    pub print_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --log-level value > -v count > None (use config value).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if let Some(level) = self.log_level.as_deref().and_then(LogLevel::parse) {
            return Some(level);
        }
        if self.verbose > 0 {
            return Some(LogLevel::from_verbosity(self.verbose));
        }
        None
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(n) = self.concurrency {
            cfg.concurrency = n;
        }
        if self.follow_symlinks {
            cfg.follow_symlinks = true;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
        if self.fsync {
            cfg.fsync = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
