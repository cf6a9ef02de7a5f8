//! "State as of this line" previews.
//!
//! An editor showing a live preview needs the buffer as it would look after
//! the script runs up to some source line, usually while the author is in
//! the middle of a section. [`reconstruct_prefix`] cuts the script at that
//! line and closes whatever section was left open so the normal pipeline
//! can run on it.

use crate::script::ast::SectionKind;
use crate::script::splitter::{Tag, lines_with_spans, parse_tag};
use crate::sim::{SimConfig, Simulation, simulate};
use keyscript_diagnostics::Diagnostic;
use keyscript_profile::ProfileRegistry;
use serde::Serialize;

/// Partial preview result.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    /// Buffer state after the reconstructed script.
    pub simulation: Simulation,
    /// The reconstructed script that was compiled.
    pub script: String,
    /// Diagnostics from compiling `script`.
    pub diagnostics: Vec<Diagnostic>,
}

/// Cut `script` after the 0-indexed line `cutoff_line` and close any section
/// still open there.
///
/// - lines after the cutoff are dropped
/// - a section open at the cutoff gets a synthetic `</KIND>`, even when
///   the cutoff is its open tag
/// - close tags with no open section are skipped
/// - every other line is copied unchanged
///
/// When the cutoff reaches the last line and nothing had to be skipped or
/// closed, `script` is returned as is, line endings included. Otherwise
/// lines are joined with `\n`.
pub fn reconstruct_prefix(script: &str, cutoff_line: usize) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut open: Option<SectionKind> = None;
    let mut seen = 0usize;

    for (line, _) in lines_with_spans(script).take(cutoff_line.saturating_add(1)) {
        seen += 1;
        match (open, parse_tag(line)) {
            (None, Some(Tag::Open { kind, .. })) => {
                open = Some(kind);
                out.push(line);
            }
            (None, Some(Tag::Close { .. })) => {}
            (Some(current), Some(Tag::Close { kind })) if kind == current => {
                open = None;
                out.push(line);
            }
            _ => out.push(line),
        }
    }

    if open.is_none() && out.len() == seen && seen == lines_with_spans(script).count() {
        return script.to_string();
    }

    let mut result = out.join("\n");
    if let Some(kind) = open {
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(&kind.close_tag());
    }
    result
}

/// Compile and simulate the script as of `cutoff_line`.
pub fn preview_at_line(
    script: &str,
    cutoff_line: usize,
    registry: &ProfileRegistry,
    config: &SimConfig,
) -> Preview {
    let prefix = reconstruct_prefix(script, cutoff_line);
    let compiled = crate::compile_with_registry(&prefix, registry);
    tracing::debug!(
        cutoff_line,
        prefix_len = prefix.len(),
        "partial preview"
    );
    Preview {
        simulation: simulate(&compiled.stream, config),
        script: prefix,
        diagnostics: compiled.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "<CODE>\nline one\nline two\n</CODE>\n<COMMANDS>\nENTER\n</COMMANDS>";

    #[test]
    fn cut_inside_code_section() {
        assert_eq!(reconstruct_prefix(SCRIPT, 1), "<CODE>\nline one\n</CODE>");
    }

    #[test]
    fn cut_on_open_tag_closes_immediately() {
        assert_eq!(reconstruct_prefix(SCRIPT, 4), "<CODE>\nline one\nline two\n</CODE>\n<COMMANDS>\n</COMMANDS>");
    }

    #[test]
    fn cut_on_close_tag_adds_nothing() {
        assert_eq!(reconstruct_prefix(SCRIPT, 3), "<CODE>\nline one\nline two\n</CODE>");
    }

    #[test]
    fn cut_past_end_keeps_everything() {
        assert_eq!(reconstruct_prefix(SCRIPT, 99), SCRIPT);
        assert_eq!(reconstruct_prefix(SCRIPT, usize::MAX), SCRIPT);
    }

    #[test]
    fn cut_past_end_keeps_line_endings() {
        let script = "<CODE>\r\nx\r\n</CODE>\n";
        assert_eq!(reconstruct_prefix(script, 99), script);
        assert_eq!(reconstruct_prefix(script, 2), script);
        assert_eq!(reconstruct_prefix(script, 1), "<CODE>\nx\n</CODE>");
    }

    #[test]
    fn cut_past_end_still_closes_open_section() {
        assert_eq!(reconstruct_prefix("<CODE>\nx\n", 99), "<CODE>\nx\n</CODE>");
    }

    #[test]
    fn orphan_close_tags_skipped() {
        assert_eq!(reconstruct_prefix("</CODE>\nhello\n</COMMANDS>", 2), "hello");
    }

    #[test]
    fn tool_suffix_kept_on_open_tag() {
        assert_eq!(
            reconstruct_prefix("<COMMANDS: VIM>\nSAVE", 1),
            "<COMMANDS: VIM>\nSAVE\n</COMMANDS>"
        );
    }

    #[test]
    fn mismatched_close_does_not_end_section() {
        assert_eq!(
            reconstruct_prefix("<CODE>\n</COMMANDS>\nx", 2),
            "<CODE>\n</COMMANDS>\nx\n</CODE>"
        );
    }
}
