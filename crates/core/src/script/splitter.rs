use super::ast::{BodyLine, Section, SectionKind};
use keyscript_diagnostics::{Diagnostic, Span, codes};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Result of splitting a script into sections.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SplitResult {
    /// Sections in source order.
    pub sections: Vec<Section>,
    /// Structural diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

// ─── Tags ───────────────────────────────────────────────────────────────────

/// A section tag recognized on a line by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag<'a> {
    /// `<KIND>` or `<KIND: TOOL>`.
    Open {
        kind: SectionKind,
        tool: Option<&'a str>,
    },
    /// `</KIND>`, with any `: TOOL` suffix ignored.
    Close { kind: SectionKind },
}

/// Recognize a tag. `line` may carry surrounding whitespace.
pub(crate) fn parse_tag(line: &str) -> Option<Tag<'_>> {
    let inner = line.trim().strip_prefix('<')?.strip_suffix('>')?;
    if let Some(rest) = inner.strip_prefix('/') {
        let name = rest.split_once(':').map_or(rest, |(name, _)| name);
        let kind = SectionKind::from_tag(name.trim())?;
        return Some(Tag::Close { kind });
    }
    match inner.split_once(':') {
        None => SectionKind::from_tag(inner.trim_end()).map(|kind| Tag::Open { kind, tool: None }),
        Some((name, tool)) => {
            let kind = SectionKind::from_tag(name.trim_end())?;
            let tool = tool.trim();
            let valid = !tool.is_empty()
                && tool
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
            valid.then_some(Tag::Open {
                kind,
                tool: Some(tool),
            })
        }
    }
}

/// Iterate lines as `(text, span)` with `\n` / `\r\n` removed.
pub(crate) fn lines_with_spans(input: &str) -> impl Iterator<Item = (&str, Span)> {
    let mut offset = 0usize;
    input.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let text = raw.strip_suffix('\n').unwrap_or(raw);
        let text = text.strip_suffix('\r').unwrap_or(text);
        (text, Span::new(start, start + text.len()))
    })
}

// ─── Splitter State Machine ─────────────────────────────────────────────────

enum Mode {
    /// Between sections; lines accumulate as text.
    Outside,
    /// Inside an open section.
    InSection {
        kind: SectionKind,
        tool: Option<String>,
        /// Span of the open tag line.
        open: Span,
        body: Vec<BodyLine>,
    },
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Split a script into text, code and command sections.
///
/// Never fails: unterminated sections run to end of input, and stray close
/// tags are skipped, each with a diagnostic.
pub fn split_sections(input: &str) -> SplitResult {
    Splitter::new(input).run()
}

struct Splitter<'a> {
    input: &'a str,
    mode: Mode,
    text: Vec<(&'a str, Span)>,
    sections: Vec<Section>,
    diags: Vec<Diagnostic>,
}

impl<'a> Splitter<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            mode: Mode::Outside,
            text: Vec::new(),
            sections: Vec::new(),
            diags: Vec::new(),
        }
    }

    fn run(mut self) -> SplitResult {
        for (line, span) in lines_with_spans(self.input) {
            match self.mode {
                Mode::Outside => self.outside_line(line, span),
                Mode::InSection { .. } => self.section_line(line, span),
            }
        }

        if let Mode::InSection {
            kind, ref tool, open, ..
        } = self.mode
        {
            let mut diag = Diagnostic::from_code(
                codes::UNTERMINATED_SECTION,
                format!("<{kind}> is never closed; closing it at end of input"),
            )
            .at(open)
            .with("kind", kind.tag());
            if let Some(tool) = tool {
                diag = diag.with("tool", tool.clone());
            }
            self.diags.push(diag);
            self.close_section(self.input.len());
        }
        self.flush_text();

        if self.sections.iter().all(|s| s.kind().is_none()) {
            self.diags.push(
                Diagnostic::from_code(codes::NO_SECTIONS, "no <CODE> or <COMMANDS> sections found")
                    .at(Span::new(0, self.input.len())),
            );
        }

        tracing::debug!(
            sections = self.sections.len(),
            diagnostics = self.diags.len(),
            "split script"
        );

        SplitResult {
            sections: self.sections,
            diagnostics: self.diags,
        }
    }

    // ── Outside a section ───────────────────────────────────────────────

    fn outside_line(&mut self, line: &'a str, span: Span) {
        match parse_tag(line) {
            Some(Tag::Open { kind, tool }) => {
                self.flush_text();
                self.mode = Mode::InSection {
                    kind,
                    tool: tool.map(str::to_ascii_uppercase),
                    open: span,
                    body: Vec::new(),
                };
            }
            Some(Tag::Close { kind }) => {
                self.diags.push(
                    Diagnostic::from_code(
                        codes::ORPHAN_CLOSE_TAG,
                        format!("</{kind}> has no open section; skipping it"),
                    )
                    .at(span)
                    .with_context(ctx!("kind" => kind.tag())),
                );
            }
            None => self.text.push((line, span)),
        }
    }

    // ── Inside a section ────────────────────────────────────────────────

    fn section_line(&mut self, line: &'a str, span: Span) {
        let Mode::InSection {
            kind: open_kind, ..
        } = self.mode
        else {
            return;
        };
        match parse_tag(line) {
            Some(Tag::Close { kind }) if kind == open_kind => {
                self.close_section(span.end);
                return;
            }
            Some(Tag::Close { kind }) => {
                self.diags.push(
                    Diagnostic::from_code(
                        codes::MISMATCHED_CLOSE_TAG,
                        format!("</{kind}> inside <{open_kind}> does not close it; kept as content"),
                    )
                    .at(span)
                    .with_context(ctx!("open" => open_kind.tag(), "found" => kind.tag())),
                );
            }
            _ => {}
        }
        if let Mode::InSection { ref mut body, .. } = self.mode {
            body.push(BodyLine {
                text: line.to_string(),
                span,
            });
        }
    }

    fn close_section(&mut self, end: usize) {
        let Mode::InSection {
            kind,
            tool,
            open,
            mut body,
        } = std::mem::replace(&mut self.mode, Mode::Outside)
        else {
            return;
        };
        trim_blank_lines(&mut body);
        self.sections
            .push(Section::tagged(kind, tool, body, Span::new(open.start, end)));
    }

    fn flush_text(&mut self) {
        let lines = std::mem::take(&mut self.text);
        let mut kept = lines.iter().filter(|(l, _)| !l.trim().is_empty());
        let Some(&(_, first)) = kept.next() else {
            return;
        };
        let last = kept.last().map_or(first, |&(_, s)| s);
        let joined = lines
            .iter()
            .map(|(l, _)| *l)
            .collect::<Vec<_>>()
            .join("\n");
        self.sections.push(Section::Text {
            content: joined.trim().to_string(),
            span: first.join(last),
        });
    }
}

fn trim_blank_lines(body: &mut Vec<BodyLine>) {
    let is_blank = |l: &BodyLine| l.text.trim().is_empty();
    let trailing = body.iter().rev().take_while(|l| is_blank(*l)).count();
    body.truncate(body.len() - trailing);
    let leading = body.iter().take_while(|l| is_blank(*l)).count();
    body.drain(..leading);
}
