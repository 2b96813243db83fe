//! End-to-end tests for the btrcc driver.
//!
//! Each test writes a `.btrc` source file to a temp directory, invokes
//! the real binary, and asserts on exit status and output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn btrcc() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_btrcc"))
}

fn write_source(dir: &Path, source: &str) -> PathBuf {
    let path = dir.join("main.btrc");
    std::fs::write(&path, source).expect("failed to write source file");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(btrcc())
        .args(args)
        .output()
        .expect("failed to invoke btrcc")
}

#[test]
fn check_accepts_valid_program() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(dir.path(), "void t() { var x = 42; }\n");
    let out = run(&["check", file.to_str().unwrap()]);
    assert!(
        out.status.success(),
        "expected success, stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn check_rejects_missing_return() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(dir.path(), "int f() { if (true) { return 1; } }\n");
    let out = run(&["check", file.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no return statement"), "stderr: {stderr}");
}

#[test]
fn check_reports_warnings_but_accepts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = "class A { public int x; }\n\
                  void t() { A p = A(); var q = p; }\n";
    let file = write_source(dir.path(), source);
    let out = run(&["check", file.to_str().unwrap()]);
    assert!(
        out.status.success(),
        "warnings alone must not fail the build, stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Aliasing managed variable"),
        "stderr: {stderr}"
    );
}

#[test]
fn check_rejects_lex_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(dir.path(), "void t() { var s = \"unterminated\n; }\n");
    let out = run(&["check", file.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Unterminated string literal"),
        "stderr: {stderr}"
    );
}

#[test]
fn check_rejects_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(dir.path(), "void t() { var x; }\n");
    let out = run(&["check", file.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("var requires an initializer"),
        "stderr: {stderr}"
    );
}

#[test]
fn check_missing_file_fails() {
    let out = run(&["check", "/nonexistent/nowhere.btrc"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Failed to read"), "stderr: {stderr}");
}

#[test]
fn tokens_json_is_machine_readable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(dir.path(), "int x = 42;\n");
    let out = run(&["tokens", file.to_str().unwrap(), "--json"]);
    assert!(out.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("tokens --json must emit valid JSON");
    let tokens = value.as_array().expect("token dump is an array");
    // int, x, =, 42, ;, Eof
    assert_eq!(tokens.len(), 6);
    assert_eq!(tokens[0]["text"], "int");
    assert_eq!(tokens[0]["line"], 1);
    assert_eq!(tokens[0]["col"], 1);
}

#[test]
fn ast_dump_contains_declarations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(dir.path(), "class A { public int x; }\n");
    let out = run(&["ast", file.to_str().unwrap()]);
    assert!(out.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("ast must emit valid JSON");
    assert!(value["declarations"].is_array());
}
