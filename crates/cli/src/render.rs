//! Pretty diagnostic rendering using ariadne.
//!
//! Converts keyscript [`Diagnostic`]s into ariadne [`Report`]s for coloured,
//! source-annotated terminal output. JSON output is handled by the callers,
//! which embed diagnostics in their own result objects.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use keyscript_diagnostics::{Diagnostic, Severity, Summary};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or detect from whether stdout is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warn => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render diagnostics to stderr with source context.
///
/// Diagnostics carrying a span are drawn as ariadne reports pointing into
/// `source`; the rest are printed as one-line messages.
pub(crate) fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let config = Config::default().with_compact(false);
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        if let Some(span) = &diag.span {
            // Clamp so a stale span can't index past the source.
            let start = span.start.min(source.len());
            let end = span.end.min(source.len()).max(start);

            let label_msg = context_note(diag).unwrap_or_else(|| diag.message.clone());
            let mut builder = Report::build(report_kind(diag.severity), (filename, start..end))
                .with_code(diag.id.as_ref())
                .with_message(&diag.message)
                .with_config(config)
                .with_label(
                    Label::new((filename, start..end))
                        .with_message(label_msg)
                        .with_color(severity_color(diag.severity)),
                );

            if let Some(explanation) = diag.explain() {
                builder = builder.with_help(explanation);
            }

            builder.finish().eprint(&mut cache).ok();
        } else {
            eprintln!("{diag}");
            if let Some(note) = context_note(diag) {
                eprintln!("  = note: {note}");
            }
            if let Some(explanation) = diag.explain() {
                eprintln!("  = help: {explanation}");
            }
        }
    }
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a coloured summary line such as `1 warning, 1 info` to stderr.
///
/// Prints nothing when there are no diagnostics.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let Summary {
        errors,
        warnings,
        infos,
    } = Summary::of(diagnostics);

    let mut parts = Vec::new();
    if errors > 0 {
        let s = if errors == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{errors} error{s}").fg(Color::Red)));
    }
    if warnings > 0 {
        let s = if warnings == 1 { "" } else { "s" };
        parts.push(format!(
            "{}",
            format!("{warnings} warning{s}").fg(Color::Yellow)
        ));
    }
    if infos > 0 {
        parts.push(format!("{}", format!("{infos} info").fg(Color::Blue)));
    }
    if !parts.is_empty() {
        eprintln!("{}", parts.join(", "));
    }
}
