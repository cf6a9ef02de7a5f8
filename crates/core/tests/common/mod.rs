//! Shared test helpers for `keyscript_core` integration tests.

#![allow(unreachable_pub)]

use keyscript_core::{CompileResult, Diagnostic, Section, SimConfig, Simulation, compile, simulate};

/// Compile with the built-in registry and simulate with default settings.
#[allow(dead_code)]
pub fn run_script(script: &str) -> (CompileResult, Simulation) {
    let compiled = compile(script);
    let sim = simulate(&compiled.stream, &SimConfig::default());
    (compiled, sim)
}

/// Rendered lines with `|` as the cursor glyph.
#[allow(dead_code)]
pub fn rendered(script: &str) -> Vec<String> {
    run_script(script).1.render('|')
}

/// Diagnostic ids in report order.
#[allow(dead_code)]
pub fn diag_ids(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(|d| d.id.to_string()).collect()
}

/// Section kind names (`"text"`, `"CODE"`, `"COMMANDS"`) in order.
#[allow(dead_code)]
pub fn section_kinds(sections: &[Section]) -> Vec<&'static str> {
    sections
        .iter()
        .map(|s| s.kind().map_or("text", |k| k.tag()))
        .collect()
}
