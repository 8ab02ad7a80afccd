//! CLI binary smoke tests using assert_cmd.
//!
//! These tests exercise the compiled `survey` binary to verify that
//! argument parsing, help text, and error handling work end-to-end.

use assert_cmd::Command;
use predicates::prelude::*;

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/titanic_sample.csv");

fn cmd() -> Command {
    Command::cargo_bin("survey").unwrap()
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("describe"))
        .stdout(predicate::str::contains("group"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("survey"));
}

// ---------------------------------------------------------------------------
// describe / group
// ---------------------------------------------------------------------------

#[test]
fn describe_prints_summary() {
    cmd()
        .args(["describe", SAMPLE])
        .assert()
        .success()
        .stdout(predicate::str::contains("13 rows x 12 columns"))
        .stdout(predicate::str::contains("Embarked"));
}

#[test]
fn describe_json() {
    cmd()
        .args(["describe", SAMPLE, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"row_count\": 13"));
}

#[test]
fn describe_wrong_extension_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manifest.txt");
    std::fs::write(&path, "x").unwrap();
    cmd()
        .arg("describe")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains(".tsv or .csv extension"));
}

#[test]
fn group_by_class_and_survival() {
    cmd()
        .args(["group", SAMPLE, "--by", "pclass", "--by", "survived"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pclass"))
        .stdout(predicate::str::contains("total=13 excluded=0"));
}

#[test]
fn group_reports_excluded_rows() {
    cmd()
        .args(["group", SAMPLE, "--by", "Embarked", "--normalize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total=12 excluded=1"));
}

#[test]
fn group_unknown_column_errors() {
    cmd()
        .args(["group", SAMPLE, "--by", "deck"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("deck"));
}

#[test]
fn group_requires_by() {
    cmd().args(["group", SAMPLE]).assert().failure();
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_writes_html_charts_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("charts");
    cmd()
        .args(["run", "-d", SAMPLE, "-f", "html", "-b", "5"])
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Effective config"))
        .stderr(predicate::str::contains("Wrote 8 charts"));
    assert!(out.join("report.html").exists());
    assert!(out.join("age_distribution.html").exists());
}

#[cfg(not(feature = "kaleido"))]
#[test]
fn run_without_format_uses_default() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["run", "-d", SAMPLE])
        .assert()
        .success()
        .stderr(predicate::str::contains("\"format\": \"html\""))
        .stderr(predicate::str::contains("Wrote 8 charts"));
    assert!(dir.path().join("charts").join("survival_counts.html").exists());
    assert!(dir.path().join("charts").join("report.html").exists());
}

#[test]
fn run_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let config = dir.path().join("config.json");
    std::fs::write(
        &config,
        format!(
            r#"{{ "data_path": {:?}, "output_dir": {:?}, "format": "html", "write_report": false }}"#,
            SAMPLE,
            out.to_str().unwrap()
        ),
    )
    .unwrap();
    cmd()
        .arg("run")
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("Effective config").not());
    assert!(out.join("survival_counts.html").exists());
    assert!(!out.join("report.html").exists());
}

#[test]
fn run_unknown_format_errors() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["run", "-d", SAMPLE, "-f", "bmp"])
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported output format"));
}

#[test]
fn run_missing_data_errors() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["run", "-d", "/nonexistent/titanic.csv", "-f", "html"])
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist"));
}

#[test]
fn run_nonexistent_config_errors() {
    cmd()
        .args(["run", "/nonexistent/config.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn run_rejects_zero_bins() {
    cmd()
        .args(["run", "-d", SAMPLE, "-f", "html", "-b", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("histogram_bins"));
}
