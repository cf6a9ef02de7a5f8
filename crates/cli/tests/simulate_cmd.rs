//! CLI tests for `keyscript simulate`.

mod common;

use common::{keyscript_cmd, run_json, write_temp};

const HELLO: &str = "\
<CODE>
Hello World
</CODE>
<COMMANDS>
ARROW_LEFT 5
BACKSPACE 5
</COMMANDS>
<CODE>
Beautiful
</CODE>
";

const PYTHON: &str = "\
<CODE: PYTHON>
def greet():
    print('hi')
</CODE>
<COMMANDS>
ARROW_UP
END
</COMMANDS>
";

#[test]
fn simulate_full_script_json() {
    let (_dir, path) = write_temp("hello.ks", HELLO);
    let json = run_json(&["simulate", &path, "--output", "json"], true);
    assert_eq!(json["lines"], serde_json::json!(["HBeautifulWorld"]));
    assert_eq!(json["cursor"]["line"], 0);
    assert_eq!(json["cursor"]["column"], 10);
    assert_eq!(json["rendered"], serde_json::json!(["HBeautiful│World"]));
    assert_eq!(json["text"], "HBeautifulWorld");
    assert!(json.get("script").is_none());
}

#[test]
fn simulate_indented_script_matches_flush_one() {
    let indented = "<CODE>\n    Hello World\n</CODE>\n\n<COMMANDS>\n    ARROW_LEFT 5\n    BACKSPACE 5\n</COMMANDS>\n\n<CODE>\n    Beautiful\n</CODE>";
    let (_dir, path) = write_temp("indented.ks", indented);
    let json = run_json(&["simulate", &path, "--output", "json"], true);
    assert_eq!(json["lines"], serde_json::json!(["HBeautifulWorld"]));
    assert_eq!(json["cursor"]["column"], 10);
    assert_eq!(json["diagnostics"].as_array().map(Vec::len), Some(0));
}

#[test]
fn simulate_plain_omits_marker() {
    let (_dir, path) = write_temp("hello.ks", HELLO);
    let output = keyscript_cmd()
        .args(["simulate", &path, "--plain", "--output", "pretty"])
        .output()
        .expect("run simulate");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "HBeautifulWorld\n");
}

#[test]
fn simulate_pretty_prints_rendered_lines() {
    let (_dir, path) = write_temp("hello.ks", HELLO);
    let output = keyscript_cmd()
        .args(["simulate", &path, "--marker", "|", "--output", "pretty"])
        .output()
        .expect("run simulate");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "HBeautiful|World\n");
}

#[test]
fn simulate_line_previews_prefix() {
    let (_dir, path) = write_temp("greet.ks", PYTHON);
    let json = run_json(&["simulate", &path, "--line", "2", "--output", "json"], true);
    assert_eq!(json["lines"], serde_json::json!(["def greet():"]));
    assert_eq!(json["script"], "<CODE: PYTHON>\ndef greet():\n</CODE>");
}

#[test]
fn simulate_line_inside_commands() {
    let (_dir, path) = write_temp("greet.ks", PYTHON);
    let json = run_json(
        &["simulate", &path, "--line", "6", "--marker", "|", "--output", "json"],
        true,
    );
    assert_eq!(
        json["rendered"],
        serde_json::json!(["def greet():|", "    print('hi')"])
    );
}

#[test]
fn simulate_line_pretty_renders_prefix_diagnostics() {
    let (_dir, path) = write_temp("bad.ks", "<COMMANDS>\nFROBNICATE\nARROW_LEFT\n</COMMANDS>\n");
    let output = keyscript_cmd()
        .args(["simulate", &path, "--line", "2", "--output", "pretty"])
        .output()
        .expect("run simulate");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("KS2001"), "stderr={stderr}");
    assert!(stderr.contains("1 warning"), "stderr={stderr}");
}

#[test]
fn simulate_line_zero_is_rejected() {
    let (_dir, path) = write_temp("greet.ks", PYTHON);
    let json = run_json(&["simulate", &path, "--line", "0", "--output", "json"], false);
    assert_eq!(json["success"], false);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("1-based")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn simulate_escaped_stream_file() {
    let (_dir, path) = write_temp("demo.stream", "ab\\al\\bX\n");
    let json = run_json(
        &["simulate", &path, "--stream", "--marker", "|", "--output", "json"],
        true,
    );
    assert_eq!(json["lines"], serde_json::json!(["Xb"]));
    assert_eq!(json["rendered"], serde_json::json!(["X|b"]));
}

#[test]
fn simulate_tab_width_option() {
    let (_dir, path) = write_temp("tab.stream", "\\tx");
    let json = run_json(
        &["simulate", &path, "--stream", "--tab-width", "2", "--output", "json"],
        true,
    );
    assert_eq!(json["lines"], serde_json::json!(["  x"]));
}

#[test]
fn simulate_dangling_marker_stream_fails() {
    let (_dir, path) = write_temp("bad.stream", "ab\\a");
    let json = run_json(&["simulate", &path, "--stream", "--output", "json"], false);
    assert_eq!(json["error"], "command_failed");
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("invalid stream")),
        "unexpected message: {}",
        json["message"]
    );
}
