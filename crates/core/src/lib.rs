//! keyscript core library.
//!
//! Compiles a typing script (`<CODE>` and `<COMMANDS>` sections, optionally
//! tagged with a tool) into a canonical keystroke stream, and replays that
//! stream against a virtual text buffer. The main entry points are
//! [`compile`] for the stream, [`simulate`] for the resulting buffer, and
//! [`preview_at_line`] for "state as of this line" previews.
//!
//! Nothing here does I/O or fails on script content: problems are reported
//! as [`Diagnostic`]s next to a best-effort result.

#![warn(missing_docs)]

/// Partial-prefix reconstruction and line previews.
pub mod preview;
/// Script structure: splitter, section processors, assembler.
pub mod script;
/// Buffer interpreter.
pub mod sim;

use keyscript_profile::ProfileRegistry;
use serde::Serialize;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Sections
pub use script::ast::{BodyLine, Section, SectionKind};
pub use script::splitter::{SplitResult, split_sections};

// Assembler
pub use script::emit::{Assembly, assemble};

// Interpreter
pub use sim::{Cursor, DEFAULT_CURSOR_MARKER, SimConfig, Simulation, simulate};

// Preview
pub use preview::{Preview, preview_at_line, reconstruct_prefix};

// Diagnostics (re-exported from the diagnostics crate)
pub use keyscript_diagnostics::{Diagnostic, Severity, Span, codes};

// Serialization helpers
pub use script::dump::to_pretty_json;

/// Result of compiling a script.
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    /// Sections in source order.
    pub sections: Vec<Section>,
    /// Canonical keystroke stream.
    pub stream: String,
    /// Structural diagnostics followed by assembly diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile a script against the built-in profile registry.
pub fn compile(input: &str) -> CompileResult {
    compile_with_registry(input, keyscript_profile::builtin())
}

/// Compile a script against `registry`.
pub fn compile_with_registry(input: &str, registry: &ProfileRegistry) -> CompileResult {
    let split = split_sections(input);
    let assembly = assemble(&split.sections, registry);

    let mut diagnostics = split.diagnostics;
    diagnostics.extend(assembly.diagnostics);

    tracing::debug!(
        sections = split.sections.len(),
        stream_len = assembly.stream.len(),
        diagnostics = diagnostics.len(),
        "compiled script"
    );

    CompileResult {
        sections: split.sections,
        stream: assembly.stream,
        diagnostics,
    }
}
