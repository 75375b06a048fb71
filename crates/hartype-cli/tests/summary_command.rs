use assert_cmd::Command;
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
fn test_summary_pretty_output() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("summary").arg(fixture("sample.har"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("HAR Summary: sample.har"))
        .stdout(predicate::str::contains("Firefox 121.0"))
        .stdout(predicate::str::contains("3 requests"))
        .stdout(predicate::str::contains("log._exportedBy"));
}

#[test]
fn test_summary_json_output() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("summary").arg(fixture("sample.har")).arg("--format").arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let summary: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(summary["total_entries"], 3);
    assert_eq!(summary["total_pages"], 1);
    assert_eq!(summary["status_classes"]["2xx"], 2);
    assert_eq!(summary["status_classes"]["4xx"], 1);
    assert_eq!(summary["time_range"]["duration_display"], "1m 9s");
    assert_eq!(summary["anomalies"], 0);
}

#[test]
fn test_summary_devtools_resource_types() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("summary")
        .arg(fixture("devtools.har"))
        .arg("--devtools")
        .arg("--format")
        .arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let summary: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(summary["resource_types"]["document"], 1);
    assert_eq!(summary["resource_types"]["image"], 1);
    assert_eq!(
        summary["vendor_fields"],
        serde_json::json!(["log.entries[]._myToolAnnotation"])
    );
}

#[test]
fn test_summary_table_output() {
    let mut cmd = Command::new(get_hartype_bin());
    cmd.arg("summary").arg(fixture("malformed.har")).arg("-f").arg("table");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Metric,Value"))
        .stdout(predicate::str::contains("Total Entries,1"));
}
