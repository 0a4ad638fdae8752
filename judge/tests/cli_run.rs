//! CLI tests for `judge run`.
//!
//! Spawns the judge binary and verifies exit codes and the printed outcome.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use judge::exit_codes;
use serde_json::Value;

fn write_inputs(dir: &Path, source: &str, tests: &str) {
    fs::write(dir.join("solution.py"), source).expect("write source");
    fs::write(dir.join("tests.json"), tests).expect("write tests");
}

fn judge_run(dir: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_judge"))
        .current_dir(dir)
        .args(["run", "--source", "solution.py", "--tests", "tests.json"])
        .args(extra)
        .output()
        .expect("judge run")
}

#[test]
fn passing_solution_exits_ok_and_prints_outcome() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_inputs(
        temp.path(),
        "def solve(a, b):\n    return a + b\n",
        r#"[{"input": [2, 3], "output": 5}]"#,
    );

    let output = judge_run(temp.path(), &[]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let outcome: Value = serde_json::from_slice(&output.stdout).expect("outcome json");
    assert_eq!(outcome["status"], "completed");
    assert_eq!(outcome["passed_count"], 1);
}

#[test]
fn timed_out_solution_exits_failed() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_inputs(
        temp.path(),
        "def solve():\n    while True:\n        pass\n",
        r#"[{"input": [], "output": 0}]"#,
    );

    let output = judge_run(temp.path(), &["--timeout-ms", "300"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    let outcome: Value = serde_json::from_slice(&output.stdout).expect("outcome json");
    assert_eq!(outcome["status"], "timeout");
}

#[test]
fn empty_test_list_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_inputs(temp.path(), "def solve():\n    return 0\n", "[]");

    let output = judge_run(temp.path(), &[]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("at least one test case"));
}

#[test]
fn unsupported_language_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_inputs(
        temp.path(),
        "function solve() {}",
        r#"[{"input": [], "output": 0}]"#,
    );

    let output = judge_run(temp.path(), &["--lang", "javascript"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported language"));
}
