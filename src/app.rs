//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! runs the organizer and prints the summary.

use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use bucket_copy::cli::Args;
use bucket_copy::config::{load_config, resolve_config_path, validate_and_normalize, ConfigLocation};
use bucket_copy::output as out;
use bucket_copy::{organize, shutdown, BucketCopyError};

use crate::logging::init_tracing;

fn print_config_location(location: &ConfigLocation) {
    match location {
        ConfigLocation::Flag(p) => {
            out::print_info(&format!("Using config from --config:\n  {}", p.display()));
        }
        ConfigLocation::Env(p) => {
            out::print_info(&format!(
                "Using BUCKET_COPY_CONFIG (explicit):\n  {}",
                p.display()
            ));
            out::print_info("To override, pass --config or unset BUCKET_COPY_CONFIG.");
        }
        ConfigLocation::Default(p) => {
            out::print_info(&format!("Default bucket_copy config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file exists there; built-in defaults apply.");
            }
        }
        ConfigLocation::None => {
            out::print_error("Could not determine a config directory; built-in defaults apply.");
        }
    }
}

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location(&resolve_config_path(args.config.as_deref()));
        return Ok(());
    }

    let (source, output) = match (args.source.clone(), args.output.clone()) {
        (Some(s), Some(o)) => (s, o),
        _ => anyhow::bail!("both --source and --output are required"),
    };

    // Defaults < XML < CLI
    let (mut cfg, location) = load_config(args.config.as_deref()).map_err(|e| {
        out::print_error(&format!("Failed to load configuration: {e:#}"));
        e
    })?;
    args.apply_overrides(&mut cfg);
    validate_and_normalize(&mut cfg)?;

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; finishing in-flight copies...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })
        .context("install Ctrl-C handler")?;
    }

    debug!(config = ?location.path().map(|p| p.display().to_string()), ?cfg, "configuration resolved");

    let opts = cfg.run_options(source, output);
    let result = match organize(&opts) {
        Ok(summary) => {
            out::print_summary(&summary);
            if summary.was_cancelled() || shutdown::is_requested() {
                let e = BucketCopyError::Interrupted;
                error!(code = e.code(), kind = e.kind(), "run interrupted");
                Err(e.into())
            } else {
                Ok(())
            }
        }
        Err(e) => {
            error!(code = e.code(), kind = e.kind(), error = %e, "run aborted");
            out::print_error(&e.to_string());
            Err(e.into())
        }
    };

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}
