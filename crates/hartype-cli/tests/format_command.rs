use assert_cmd::Command;
use hartype_cli::Schema;
use hartype_cli::commands::format::render;
use hartype_core::har::{ParseOptions, WriteOptions};
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn get_hartype_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("hartype")
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_json(name: &str) -> Value {
    let content = std::fs::read_to_string(fixture(name)).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_format_command_help() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("format").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--include-nulls"))
        .stdout(predicate::str::contains("--compact"))
        .stdout(predicate::str::contains("--devtools"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_format_to_stdout_is_lossless() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("format").arg(fixture("sample.har"));

    let output = cmd.assert().success().get_output().stdout.clone();
    let out: Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(out, fixture_json("sample.har"));
    assert_eq!(
        out["log"]["entries"][0]["request"]["cookies"][0]["expires"],
        "Wed, 21-Oct-2026 07:28:00 GMT"
    );
    assert_eq!(out["log"]["_exportedBy"], "shop-recorder");
}

#[test]
fn test_format_devtools_to_output_file() {
    let temp = TempDir::new().unwrap();
    let output_path = temp.path().join("out.har");

    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("format")
        .arg(fixture("devtools.har"))
        .arg("--devtools")
        .arg("--compact")
        .arg("-o")
        .arg(&output_path);

    cmd.assert().success();

    let written = std::fs::read_to_string(&output_path).unwrap();
    assert!(!written.contains('\n'));

    let out: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(out, fixture_json("devtools.har"));
}

#[test]
fn test_format_strict_rejects_malformed_file() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("format").arg(fixture("malformed.har")).arg("--strict");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("anomal"));
}

#[test]
fn test_format_lenient_fills_defaults() {
    let content = std::fs::read_to_string(fixture("malformed.har")).unwrap();
    let json = render(
        &content,
        Schema::Har,
        &ParseOptions::lenient(),
        &WriteOptions::new(),
    )
    .unwrap();
    let out: Value = serde_json::from_str(&json).unwrap();

    let entry = &out["log"]["entries"][0];
    assert_eq!(out["log"]["version"], "1.2");
    assert_eq!(entry["startedDateTime"], "yesterday");
    assert_eq!(entry["time"], 0);
    assert_eq!(entry["request"]["headersSize"], -1);
    assert_eq!(entry["request"]["headers"], serde_json::json!([]));
}

#[test]
fn test_format_include_nulls() {
    let content = std::fs::read_to_string(fixture("sample.har")).unwrap();
    let json = render(
        &content,
        Schema::Har,
        &ParseOptions::lenient(),
        &WriteOptions::new().with_include_nulls(true),
    )
    .unwrap();
    let out: Value = serde_json::from_str(&json).unwrap();

    assert!(out["log"]["entries"][2]["pageref"].is_null());
    assert!(
        out["log"]["entries"][2]
            .as_object()
            .unwrap()
            .contains_key("pageref")
    );
}

#[test]
fn test_format_missing_file() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("format").arg("does-not-exist.har");

    cmd.assert().failure();
}
