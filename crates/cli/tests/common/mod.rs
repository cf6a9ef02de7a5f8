//! Shared helpers for `keyscript` CLI tests.

#![allow(unreachable_pub)]

use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use assert_cmd::cargo;

/// A `keyscript` command ready for arguments.
#[allow(dead_code)]
pub fn keyscript_cmd() -> Command {
    Command::new(cargo::cargo_bin!("keyscript"))
}

/// Write `content` to `name` inside a fresh temp dir.
#[allow(dead_code)]
pub fn write_temp(name: &str, content: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write temp file");
    (dir, path.to_string_lossy().to_string())
}

/// Run with `args` and parse stdout as JSON, asserting the exit status.
#[allow(dead_code)]
pub fn run_json(args: &[&str], expect_success: bool) -> serde_json::Value {
    let output = keyscript_cmd().args(args).output().expect("run keyscript");
    assert_eq!(
        output.status.success(),
        expect_success,
        "status {:?}, stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    parse_stdout(&output)
}

/// Run with `args`, feeding `body` on stdin.
#[allow(dead_code)]
pub fn run_with_stdin(args: &[&str], body: &str) -> Output {
    let mut child = keyscript_cmd()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn keyscript");
    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(body.as_bytes())
        .expect("write stdin body");
    child.wait_with_output().expect("wait for output")
}

/// Parse stdout of a finished command as JSON.
#[allow(dead_code)]
pub fn parse_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid json ({e}): {stdout}"))
}
