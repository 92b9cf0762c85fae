//! Integration tests for the `list-labels` command.

mod common;

use assert_cmd::Command;
use common::{write_config, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

fn filestage() -> Command {
    Command::cargo_bin("filestage").expect("Failed to find filestage binary")
}

#[test]
fn test_list_labels_plain_output_sorted() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    let config = write_config(
        &project,
        "targets:\n  zeta:\n    \"*\": true\n  alpha:\n    \"*\": true\n",
    );

    let output = filestage()
        .args(["list-labels", "--config"])
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Available labels:"));
    let alpha = stdout.find("alpha").unwrap();
    let zeta = stdout.find("zeta").unwrap();
    assert!(alpha < zeta);
}

#[test]
fn test_list_labels_includes_transitive_documents() {
    let temp = TempDir::new().unwrap();
    let lib = temp.path().join("lib");
    let app = temp.path().join("app");
    write_config(&lib, "targets:\n  libdocs:\n    \"*\": true\n");
    let config = write_config(
        &app,
        "sources:\n  lib: ../lib\ntargets:\n  default:\n    \"*\": true\n",
    );

    filestage()
        .args(["list-labels", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("default"))
        .stdout(predicate::str::contains("libdocs"));
}

#[test]
fn test_list_labels_json_format() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    let config = write_config(&project, "targets:\n  ci:\n    \"*\": true\n");

    let output = filestage()
        .args(["list-labels", "--format", "json", "--config"])
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success());
    let labels: Vec<String> =
        serde_json::from_slice(&output.stdout).expect("stdout should be a JSON array");
    assert_eq!(labels, vec!["ci"]);
}

#[test]
fn test_list_labels_deduplicates_across_documents() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    let config_a = write_config(&first, "targets:\n  shared:\n    \"*\": true\n");
    let config_b = write_config(&second, "targets:\n  shared:\n    \"*\": true\n");

    let output = filestage()
        .args(["list-labels", "--config"])
        .arg(&config_a)
        .args(["--config"])
        .arg(&config_b)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("shared").count(), 1);
}

#[test]
fn test_list_labels_performs_no_mutation() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    write_file(&project.join("a.txt"), "a");
    let config = write_config(
        &project,
        "options:\n  destination: ../dest\ntargets:\n  default:\n    \"a.txt\": true\n",
    );

    filestage()
        .args(["list-labels", "--config"])
        .arg(&config)
        .assert()
        .success();

    // The destination named by the document's options was never created
    assert!(!temp.path().join("dest").exists());
}

#[test]
fn test_list_labels_missing_document_reports_nothing_found() {
    filestage()
        .args(["list-labels", "--config", "/no/such/.filestage.yaml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("no labels found"));
}
