//! Integration tests for the `errstringcheck` binary.

mod common;

use assert_cmd::prelude::*;
use common::*;
use errstringcheck::ir::AnalysisInput;
use errstringcheck::testkit::{Arg, PackageBuilder};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn errstringcheck(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_errstringcheck"));
    cmd.current_dir(dir)
        .env_remove("ERRSTRINGCHECK_WRAPONLY")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_diagnostics_exit_with_status_3() {
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "errorf.json", &errorf_input());

    let assert = errstringcheck(temp.path()).arg(&input).assert().code(3);
    let out = stdout(assert.get_output());

    let first = format!("errorf/errorf.go:6:12: {}", PERMISSIVE_MESSAGE);
    assert!(out.lines().any(|line| line == first), "stdout: {}", out);
    assert_eq!(
        out.lines().filter(|line| line.contains("invalid format")).count(),
        PERMISSIVE_LINES.len()
    );
    assert!(out.contains("11 issue(s)"));
}

#[test]
fn test_clean_input_exits_successfully() {
    let temp = TempDir::new().unwrap();
    let clean = AnalysisInput {
        packages: vec![PackageBuilder::new("clean")
            .errorf("open config: %w", [Arg::Error("err")])
            .errorf("retry %d", [Arg::Int("n")])
            .build()],
    };
    let input = write_input(temp.path(), "clean.json", &clean);

    let assert = errstringcheck(temp.path()).arg(&input).assert().success();
    let out = stdout(assert.get_output());
    assert!(out.contains("1 package(s), 1 function(s), 2 Errorf call(s), 0 skipped: ok"));
}

#[test]
fn test_wraponly_flag_rejects_display_verb() {
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "errorf.json", &errorf_input());

    let assert = errstringcheck(temp.path())
        .args(["--wraponly", "--format", "json"])
        .arg(&input)
        .assert()
        .code(3);

    let json: Value = serde_json::from_str(&stdout(assert.get_output())).unwrap();
    assert_eq!(json["policy"]["wraponly"], Value::Bool(true));
    assert_eq!(json["summary"]["reported"], WRAP_ONLY_LINES.len());
    assert_eq!(json["diagnostics"][0]["message"], WRAP_ONLY_MESSAGE);
    assert_eq!(json["diagnostics"][0]["rule"], "errstringcheck");
}

#[test]
fn test_wraponly_from_environment() {
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "errorf.json", &errorf_input());

    let assert = errstringcheck(temp.path())
        .env("ERRSTRINGCHECK_WRAPONLY", "true")
        .arg(&input)
        .assert()
        .code(3);
    assert!(stdout(assert.get_output()).contains(WRAP_ONLY_MESSAGE));
}

#[test]
fn test_discovered_config_file_enables_wraponly() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".errstringcheck.toml"), "wraponly = true\n").unwrap();
    let nested = temp.path().join("pkg");
    fs::create_dir_all(&nested).unwrap();
    let input = write_input(&nested, "errorf.json", &errorf_input());

    let assert = errstringcheck(&nested)
        .args(["-f", "json"])
        .arg(&input)
        .assert()
        .code(3);
    let json: Value = serde_json::from_str(&stdout(assert.get_output())).unwrap();
    assert_eq!(json["summary"]["reported"], WRAP_ONLY_LINES.len());
}

#[test]
fn test_explicit_config_and_jobs() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("strict.toml");
    fs::write(&config, "wraponly = true\njobs = 4\n").unwrap();
    let input = write_input(temp.path(), "errorf.json", &errorf_input());
    let output = temp.path().join("report.json");

    let assert = errstringcheck(temp.path())
        .arg("-c")
        .arg(&config)
        .args(["-f", "json", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .code(3);
    assert!(stdout(assert.get_output()).is_empty());

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["summary"]["reported"], WRAP_ONLY_LINES.len());
}

#[test]
fn test_invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("broken.toml");
    fs::write(&config, "wraponly = \"sometimes\"\n").unwrap();
    let input = write_input(temp.path(), "errorf.json", &errorf_input());

    let assert = errstringcheck(temp.path())
        .arg("--config")
        .arg(&config)
        .arg(&input)
        .assert()
        .code(1);
    let err = stderr(assert.get_output());
    assert!(err.contains("invalid configuration"));
    assert!(err.contains("hint: check that"));
    assert!(err.contains("broken.toml exists and is well-formed"));
}

#[test]
fn test_missing_input_fails() {
    let temp = TempDir::new().unwrap();

    let assert = errstringcheck(temp.path())
        .arg("missing.json")
        .assert()
        .code(1);
    let err = stderr(assert.get_output());
    assert!(err.contains("failed to read missing.json"));
    assert!(err.contains("hint: check that missing.json exists and is well-formed"));
}

#[test]
fn test_malformed_input_fails() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("broken.json");
    fs::write(&input, "{\"packages\": [{\"path\": 1}]}").unwrap();

    let assert = errstringcheck(temp.path()).arg(&input).assert().code(1);
    assert!(stderr(assert.get_output()).contains("failed to parse analysis input"));
}

#[test]
fn test_multiple_inputs_are_merged() {
    let temp = TempDir::new().unwrap();
    let first = write_input(temp.path(), "a.json", &errorf_input());
    let second = write_input(temp.path(), "b.json", &errorf_input());

    let assert = errstringcheck(temp.path())
        .args(["--format", "json"])
        .arg(&first)
        .arg(&second)
        .assert()
        .code(3);
    let json: Value = serde_json::from_str(&stdout(assert.get_output())).unwrap();
    assert_eq!(json["summary"]["packages"], 2);
    assert_eq!(json["summary"]["reported"], 2 * PERMISSIVE_LINES.len());
}
