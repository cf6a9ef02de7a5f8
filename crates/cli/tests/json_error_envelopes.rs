//! Command failures honor `--output json`.

mod common;

use common::{keyscript_cmd, run_json, write_temp};

#[test]
fn missing_script_emits_json_error_envelope() {
    let json = run_json(&["compile", "nope-does-not-exist.ks", "--output", "json"], false);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "command_failed");
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("failed to read")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn invalid_profile_file_emits_json_error_envelope() {
    let (_dir, path) = write_temp("bad.json", r#"{ "id": "bad id" }"#);
    let json = run_json(&["profiles", "--profile", &path, "--output", "json"], false);
    assert_eq!(json["error"], "command_failed");
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("invalid profile file")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn unknown_profile_emits_json_error_envelope() {
    let json = run_json(&["profiles", "EMACS", "--output", "json"], false);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("unknown profile 'EMACS'") && m.contains("VIM")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn pretty_failure_goes_to_stderr() {
    let output = keyscript_cmd()
        .args(["check", "nope-does-not-exist.ks", "--output", "pretty"])
        .output()
        .expect("run check");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: failed to read"));
}
