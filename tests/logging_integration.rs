use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use assert_fs::prelude::*;
use assert_fs::TempDir;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tsfmt, registry};

use bucket_copy::{organize, RunOptions};

/// A simple writer that appends written bytes into an in-memory Vec<u8>.
#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture<F: FnOnce()>(level: &str, f: F) -> String {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let layer = tsfmt::layer()
        .with_writer(make_writer)
        .with_target(false)
        .with_ansi(false)
        .compact();
    let subscriber = registry().with(EnvFilter::new(level)).with(layer);

    // Scoped to this thread so other tests keep their own (absent) subscriber.
    let dispatch = tracing::Dispatch::new(subscriber);
    tracing::dispatcher::with_default(&dispatch, f);

    let bytes = buf.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn run_reports_start_and_completion() {
    let td = TempDir::new().unwrap();
    td.child("src/a.txt").write_str("a").unwrap();
    let opts = RunOptions::new(td.path().join("src"), td.path().join("out"));

    let logs = capture("info", || {
        organize(&opts).unwrap();
    });
    assert!(logs.contains("starting run"), "logs: {logs}");
    assert!(logs.contains("run complete"), "logs: {logs}");
    assert!(logs.contains("found=1"), "logs: {logs}");
}

#[test]
fn empty_source_logs_no_files_found() {
    let td = TempDir::new().unwrap();
    td.child("src").create_dir_all().unwrap();
    let opts = RunOptions::new(td.path().join("src"), td.path().join("out"));

    let logs = capture("info", || {
        organize(&opts).unwrap();
    });
    assert!(logs.contains("no files found"), "logs: {logs}");
}

#[test]
fn default_warn_level_hides_progress() {
    let td = TempDir::new().unwrap();
    td.child("src/a.txt").write_str("a").unwrap();
    let opts = RunOptions::new(td.path().join("src"), td.path().join("out"));

    let logs = capture("warn", || {
        organize(&opts).unwrap();
    });
    assert!(!logs.contains("starting run"), "logs: {logs}");
}
