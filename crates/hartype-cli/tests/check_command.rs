use assert_cmd::Command;
use hartype_cli::Schema;
use hartype_cli::commands::check::check_str;
use predicates::prelude::*;
use std::path::PathBuf;

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

#[test]
fn test_check_clean_file() {
    let content = std::fs::read_to_string(fixture("sample.har")).unwrap();
    let report = check_str(&content, Schema::Har, "sample.har").unwrap();

    assert!(report.is_clean(), "{:?}", report);
    assert_eq!(report.total_entries, 3);
}

#[test]
fn test_check_reports_anomaly_paths() {
    let content = std::fs::read_to_string(fixture("malformed.har")).unwrap();
    let report = check_str(&content, Schema::Har, "malformed.har").unwrap();

    let paths: Vec<&str> = report.anomalies.iter().map(|f| f.path.as_str()).collect();
    assert!(paths.contains(&"log.version"));
    assert!(paths.contains(&"log.creator.version"));
    assert!(paths.contains(&"log.entries[0].startedDateTime"));
    assert!(paths.contains(&"log.entries[0].time"));
    assert!(report.validation_error.is_none());
}

#[test]
fn test_check_command_lenient_succeeds_with_anomalies() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("check").arg(fixture("malformed.har"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("log.entries[0].time"));
}

#[test]
fn test_check_command_strict_fails_on_anomalies() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("check").arg(fixture("malformed.har")).arg("--strict");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("structural anomalies"));
}

#[test]
fn test_check_command_json_output() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("--format")
        .arg("json")
        .arg("check")
        .arg(fixture("devtools.har"))
        .arg("--devtools");

    let output = cmd.assert().success().get_output().stdout.clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(report["file_name"], "devtools.har");
    assert_eq!(report["total_entries"], 2);
    assert_eq!(report["anomalies"], serde_json::json!([]));
}

#[test]
fn test_check_command_fails_on_unknown_pageref() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("orphan.har");
    let content = std::fs::read_to_string(fixture("sample.har"))
        .unwrap()
        .replace("\"pageref\": \"page_1\"", "\"pageref\": \"page_9\"");
    std::fs::write(&path, content).unwrap();

    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("check").arg(&path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("page_9"));
}
