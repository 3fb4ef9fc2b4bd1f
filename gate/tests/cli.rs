#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Committed repository with the given `city.toml`
fn make_repo(base: &Path, city_toml: &str) -> PathBuf {
    let repo = base.join("widget");
    fs::create_dir(&repo).unwrap();
    fs::write(repo.join("city.toml"), city_toml).unwrap();
    for args in [
        &["init", "--quiet"][..],
        &["add", "-A"][..],
        &[
            "-c",
            "user.name=gate",
            "-c",
            "user.email=gate@example.invalid",
            "commit",
            "--quiet",
            "-m",
            "init",
        ][..],
    ] {
        let status = Command::new("git")
            .arg("-C")
            .arg(&repo)
            .args(args)
            .status()
            .unwrap();
        assert!(status.success());
    }
    repo
}

fn run_json(args: &[&str], expected_code: i32) -> Value {
    let mut cmd = cargo_bin_cmd!("gate");
    cmd.args(["city", "--json", "--no-record"]).args(args);
    let out = cmd.assert().code(expected_code).get_output().stdout.clone();
    serde_json::from_slice(&out).expect("valid json output")
}

#[test]
fn help_exits_zero() {
    let mut cmd = cargo_bin_cmd!("gate");
    let out = cmd.arg("--help").assert().success().get_output().stdout.clone();
    assert!(String::from_utf8_lossy(&out).contains("city"));
}

#[test]
fn usage_errors_exit_three() {
    cargo_bin_cmd!("gate").arg("city").assert().code(3);
    cargo_bin_cmd!("gate")
        .args(["city", ".", "--standalone-timeout", "soon"])
        .assert()
        .code(3);
    cargo_bin_cmd!("gate")
        .args(["city", ".", "--unknown-flag"])
        .assert()
        .code(3);
}

#[test]
fn non_repository_is_invalid() {
    let tmp = TempDir::new().unwrap();
    let value = run_json(&[tmp.path().to_str().unwrap()], 3);
    assert_eq!(value["status"], "invalid");
    assert_eq!(value["pass"], false);
    assert_eq!(value["checks"][0]["name"], "contract");
}

#[test]
fn empty_contract_warns_with_documented_shape() {
    let tmp = TempDir::new().unwrap();
    let repo = make_repo(tmp.path(), "[city]\nschema_version = 1\n");

    let value = run_json(&[repo.to_str().unwrap()], 2);
    assert_eq!(value["status"], "warn");
    assert_eq!(value["repo"], "widget");
    assert_eq!(value["exit_code"], 2);
    assert_eq!(value["summary"]["pass"], 2);
    assert_eq!(value["summary"]["skip"], 2);
    for check in value["checks"].as_array().unwrap() {
        for key in ["name", "status", "detail", "duration_ms"] {
            assert!(check.get(key).is_some(), "check missing {}", key);
        }
    }
    assert!(value.get("ledger_id").is_none());
}

#[test]
fn failing_boundary_exits_one_and_writes_output_file() {
    let tmp = TempDir::new().unwrap();
    let repo = make_repo(
        tmp.path(),
        "[city]\nschema_version = 1\npolis_files = [\"secret.yaml\"]\n",
    );
    let out_file = tmp.path().join("verdict.json");

    let mut cmd = cargo_bin_cmd!("gate");
    let stdout = cmd
        .args(["city", "--no-record", "--skip-standalone", "-o"])
        .arg(&out_file)
        .arg(&repo)
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&stdout);
    assert!(text.contains("FAIL"));
    assert!(text.contains("not ignored by Git semantics: secret.yaml"));

    let saved: Value = serde_json::from_str(&fs::read_to_string(&out_file).unwrap()).unwrap();
    assert_eq!(saved["status"], "fail");
    assert_eq!(saved["checks"][0]["status"], "fail");
}
