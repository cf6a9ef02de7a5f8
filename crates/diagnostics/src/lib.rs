//! Diagnostics for the keyscript toolchain.
//!
//! Script problems never abort compilation. They are collected as
//! [`Diagnostic`] values and returned next to whatever output could be
//! produced. Codes live in [`codes`]; their long-form text is available
//! through [`explain`] and their default level through [`default_severity`].

#![warn(missing_docs)]

/// Diagnostic code constants generated from `data/diagnostics.json`.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

// ── Severity / Span ──────────────────────────────────────────────────────

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// The script cannot mean what it says.
    Error,
    /// The script compiled, but some of it was skipped or reinterpreted.
    Warn,
    /// Informational note.
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
        })
    }
}

/// Byte range `[start, end)` in the script.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    /// First byte.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Smallest span covering both.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

// ── Diagnostic ───────────────────────────────────────────────────────────

/// One reported problem or note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Code such as `"KS2001"`.
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Where in the script, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable details (`"command"`, `"tool"`, ...). Sorted keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with an explicit severity.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Create a diagnostic at the code's default severity.
    ///
    /// Codes missing from the table fall back to [`Severity::Warn`].
    pub fn from_code(id: &'static str, message: impl Into<String>) -> Self {
        let severity = default_severity(id).unwrap_or(Severity::Warn);
        Self::new(id, severity, message, None)
    }

    /// Attach a source span.
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Replace the context map.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Add one context entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Long-form explanation of this diagnostic's code.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Count of diagnostics per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of errors.
    pub errors: usize,
    /// Number of warnings.
    pub warnings: usize,
    /// Number of info notes.
    pub infos: usize,
}

impl Summary {
    /// Tally `diagnostics`.
    pub fn of(diagnostics: &[Diagnostic]) -> Self {
        diagnostics
            .iter()
            .fold(Self::default(), |mut acc, d| {
                match d.severity {
                    Severity::Error => acc.errors += 1,
                    Severity::Warn => acc.warnings += 1,
                    Severity::Info => acc.infos += 1,
                }
                acc
            })
    }
}

/// Long-form explanation for a diagnostic code.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Default severity for a diagnostic code.
pub fn default_severity(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Span ────────────────────────────────────────────────────────────

    #[test]
    fn span_join_covers_both() {
        assert_eq!(Span::new(4, 8).join(Span::new(2, 5)), Span::new(2, 8));
        assert_eq!(Span::new(1, 1).join(Span::new(6, 9)), Span::new(1, 9));
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    // ── Codes ────────────────────────────────────────────────────────────

    #[test]
    fn every_code_has_explanation_and_severity() {
        for code in codes::ALL {
            assert!(explain(code).is_some(), "{code} has no explanation");
            assert!(default_severity(code).is_some(), "{code} has no severity");
        }
        assert_eq!(codes::ALL.len(), 10);
    }

    #[test]
    fn default_severities() {
        assert_eq!(default_severity(codes::UNKNOWN_TOOL), Some(Severity::Info));
        assert_eq!(default_severity(codes::NO_SECTIONS), Some(Severity::Info));
        assert_eq!(default_severity(codes::UNKNOWN_COMMAND), Some(Severity::Warn));
        assert_eq!(default_severity("KS9999"), None);
    }

    // ── Diagnostic ──────────────────────────────────────────────────────

    #[test]
    fn from_code_uses_default_severity() {
        let d = Diagnostic::from_code(codes::UNKNOWN_TOOL, "no profile for 'EMACS'");
        assert_eq!(d.id, "KS1004");
        assert_eq!(d.severity, Severity::Info);
        let d = Diagnostic::from_code("CUSTOM", "x");
        assert_eq!(d.severity, Severity::Warn);
    }

    #[test]
    fn builder_methods() {
        let d = Diagnostic::from_code(codes::UNKNOWN_COMMAND, "unknown command 'JUMP'")
            .at(Span::new(10, 14))
            .with("command", "JUMP")
            .with("tool", "VIM");
        assert_eq!(d.span, Some(Span::new(10, 14)));
        let ctx = d.context.as_ref().unwrap();
        assert_eq!(ctx["command"], "JUMP");
        assert_eq!(ctx["tool"], "VIM");
    }

    #[test]
    fn display_format() {
        let d = Diagnostic::from_code(codes::MALFORMED_COUNT, "count 'abc' is not an integer");
        assert_eq!(d.to_string(), "warn[KS2002]: count 'abc' is not an integer");
    }

    #[test]
    fn explain_mentions_subject() {
        let d = Diagnostic::from_code(codes::REPEAT_IGNORED, "");
        assert!(d.explain().unwrap().contains("count is ignored"));
        assert!(explain("UNKNOWN").is_none());
    }

    #[test]
    fn summary_tallies() {
        let ds = vec![
            Diagnostic::from_code(codes::UNKNOWN_COMMAND, "a"),
            Diagnostic::from_code(codes::UNKNOWN_TOOL, "b"),
            Diagnostic::from_code(codes::MALFORMED_COUNT, "c"),
            Diagnostic::new("X", Severity::Error, "d", None),
        ];
        assert_eq!(
            Summary::of(&ds),
            Summary {
                errors: 1,
                warnings: 2,
                infos: 1
            }
        );
    }

    // ── Serde ───────────────────────────────────────────────────────────

    #[test]
    fn serde_roundtrip_with_context() {
        let d = Diagnostic::from_code(codes::NON_POSITIVE_COUNT, "count 0")
            .at(Span::new(0, 5))
            .with("count", "0")
            .with("command", "ARROW_UP");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.find("command").unwrap() < json.find("count\":").unwrap());
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn serde_omits_absent_fields() {
        let json = serde_json::to_string(&Diagnostic::from_code(codes::NO_SECTIONS, "x")).unwrap();
        assert!(!json.contains("span"), "{json}");
        assert!(!json.contains("context"), "{json}");
        assert!(json.contains("\"severity\":\"info\""), "{json}");
    }
}
