//! User-facing terminal output.
//! Small wrapper around stdout/stderr printing to provide consistent, colored
//! messages. Colors are enabled only when output is a TTY.

use owo_colors::OwoColorize;

use crate::summary::RunSummary;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// One-line run summary on stdout; failed files are listed on stderr.
/// The prefix changes from `ok:` to `done:` when files failed, or `interrupted:` after cancellation.
pub fn print_summary(summary: &RunSummary) {
    let line = summary.to_string();
    if summary.was_cancelled() {
        if is_tty() {
            println!("{} {}", "interrupted:".yellow().bold(), line);
        } else {
            println!("interrupted: {}", line);
        }
    } else if summary.failure_count() > 0 {
        if is_tty() {
            println!("{} {}", "done:".yellow().bold(), line);
        } else {
            println!("done: {}", line);
        }
    } else {
        print_success(&line);
    }
    for failure in &summary.failures {
        print_warn(&format!(
            "failed: {}: {}",
            failure.path.display(),
            failure.message
        ));
    }
}
