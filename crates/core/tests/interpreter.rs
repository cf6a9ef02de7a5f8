//! Buffer interpreter tests driven through compiled scripts.

mod common;

use common::{rendered, run_script};
use keyscript_core::{Cursor, SimConfig, simulate};

#[test]
fn code_only_script_round_trips() {
    let (_, sim) = run_script("<CODE>\nfn main() {\n    println!(\"hi\");\n}\n</CODE>");
    assert_eq!(sim.lines, vec!["fn main() {", "    println!(\"hi\");", "}"]);
    assert_eq!(sim.cursor, Cursor::new(2, 1));
}

#[test]
fn right_then_backspace_deletes_left_of_cursor() {
    let (_, sim) = run_script(
        "<CODE>\nabcdefgh\n</CODE>\n<COMMANDS>\nHOME\nARROW_RIGHT 5\nBACKSPACE 2\n</COMMANDS>",
    );
    assert_eq!(sim.lines, vec!["abcfgh"]);
    assert_eq!(sim.cursor, Cursor::new(0, 3));
}

#[test]
fn backspace_joins_lines() {
    let (_, sim) = run_script("<CODE>\none\ntwo\n</CODE>\n<COMMANDS>\nHOME\nBACKSPACE\n</COMMANDS>");
    assert_eq!(sim.lines, vec!["onetwo"]);
    assert_eq!(sim.cursor, Cursor::new(0, 3));
}

#[test]
fn enter_in_middle_of_line_splits_it() {
    let lines = rendered("<CODE>\nleftright\n</CODE>\n<COMMANDS>\nARROW_LEFT 5\nENTER\n</COMMANDS>");
    assert_eq!(lines, vec!["left", "|right"]);
}

#[test]
fn python_macro_positions_cursor() {
    let (_, sim) = run_script("<CODE: PYTHON>\n{{PRINT_DEBUG}}\n</CODE>");
    assert_eq!(sim.lines, vec!["print(f\"DEBUG: {}\"))"]);
    assert_eq!(sim.cursor, Cursor::new(0, 15));
}

#[test]
fn try_except_macro_moves_up() {
    let (_, sim) = run_script("<CODE: PYTHON>\n{{TRY_EXCEPT}}\n</CODE>");
    assert_eq!(
        sim.lines,
        vec!["try:", "    ", "except Exception as e:", "    print(f\"Error: {e}\")"]
    );
    // Four ups from line 3 clamp at the first line, then End.
    assert_eq!(sim.cursor, Cursor::new(0, 4));
}

#[test]
fn dispatcher_only_commands_leave_buffer_alone() {
    let (_, sim) = run_script(
        "<CODE>\nx\n</CODE>\n<COMMANDS: VSCODE>\nSAVE\nCOMMAND_PALETTE\n</COMMANDS>\n<COMMANDS>\nSLEEP 3\nEXIT_ARROW_MODE\nSHIFT_PRESS\nSHIFT_RELEASE\nESCAPE\n</COMMANDS>",
    );
    assert_eq!(sim.lines, vec!["x"]);
    assert_eq!(sim.cursor, Cursor::new(0, 1));
}

#[test]
fn unicode_columns() {
    let sim = simulate("añb\u{7}l\u{8}", &SimConfig::default());
    assert_eq!(sim.lines, vec!["ab"]);
    assert_eq!(sim.cursor, Cursor::new(0, 1));
}

#[test]
fn custom_marker_and_tab_width() {
    let cfg = SimConfig {
        tab_width: 8,
        page_size: 10,
        cursor_marker: '_',
    };
    let sim = simulate("\t", &cfg);
    assert_eq!(sim.render(cfg.cursor_marker), vec!["        _"]);
}
