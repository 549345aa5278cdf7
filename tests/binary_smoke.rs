// use macro form directly; no import needed
use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::process::{Command, Output};

/// Run the binary with an empty explicit config so the user's own file never leaks in.
fn run(td: &TempDir, args: &[&str]) -> Output {
    let cfg = td.child("empty-config.xml");
    cfg.write_str("<config></config>").unwrap();
    let me = assert_cmd::cargo::cargo_bin!("bucket_copy");
    Command::new(me)
        .args(args)
        .env("BUCKET_COPY_CONFIG", cfg.path())
        .output()
        .expect("spawn binary")
}

#[test]
fn binary_print_config_succeeds() {
    let td = TempDir::new().unwrap();
    let out = run(&td, &["--print-config"]);
    assert!(out.status.success(), "binary should succeed with --print-config");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("BUCKET_COPY_CONFIG"), "stdout: {stdout}");
}

#[test]
fn binary_sorts_files_and_prints_summary() {
    let td = TempDir::new().unwrap();
    td.child("src/a.txt").write_str("a").unwrap();
    td.child("src/b.TXT").write_str("b").unwrap();
    td.child("src/c").write_str("c").unwrap();
    let src = td.path().join("src");
    let out_dir = td.path().join("out");

    let out = run(
        &td,
        &["-s", src.to_str().unwrap(), "-o", out_dir.to_str().unwrap(), "-c", "2"],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("found=3 processed=3 copied=3"), "stdout: {stdout}");
    td.child("out/txt/a.txt").assert("a");
    td.child("out/txt/b.TXT").assert("b");
    td.child("out/no_extension/c").assert("c");
}

#[test]
fn binary_missing_source_exits_with_failure() {
    let td = TempDir::new().unwrap();
    let src = td.path().join("does-not-exist");
    let out_dir = td.path().join("out");
    let out = run(&td, &["-s", src.to_str().unwrap(), "-o", out_dir.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!out_dir.exists());
}

#[test]
fn binary_malformed_config_exits_with_failure() {
    let td = TempDir::new().unwrap();
    td.child("src/a.txt").write_str("a").unwrap();
    let bad = td.child("bad.xml");
    bad.write_str("<config><colour>blue</colour></config>").unwrap();
    let src = td.path().join("src");
    let out_dir = td.path().join("out");
    let out = run(
        &td,
        &[
            "--config",
            bad.path().to_str().unwrap(),
            "-s",
            src.to_str().unwrap(),
            "-o",
            out_dir.to_str().unwrap(),
        ],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(!out_dir.exists());
}

#[test]
fn binary_json_logs_are_structured() {
    let td = TempDir::new().unwrap();
    td.child("src/x.json").write_str("{}").unwrap();
    let src = td.path().join("src");
    let out_dir = td.path().join("out");
    let out = run(
        &td,
        &["-s", src.to_str().unwrap(), "-o", out_dir.to_str().unwrap(), "--json", "-v"],
    );
    assert!(out.status.success());

    let stderr = String::from_utf8_lossy(&out.stderr);
    let events: Vec<serde_json::Value> = stderr
        .lines()
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect();
    let start = events
        .iter()
        .find(|e| e["fields"]["message"] == "starting run")
        .unwrap_or_else(|| panic!("no start event in: {stderr}"));
    assert_eq!(start["level"], "INFO");
    assert!(start["fields"]["concurrency"].as_u64().is_some());
    assert!(events.iter().any(|e| e["fields"]["message"] == "run complete"));
}
