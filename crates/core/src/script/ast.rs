use keyscript_diagnostics::Span;
use serde::{Deserialize, Serialize};

/// The two tagged section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// `<CODE>`: typed verbatim, with macro expansion.
    Code,
    /// `<COMMANDS>`: one named command per line.
    Commands,
}

impl SectionKind {
    /// Tag name as written in canonical form.
    pub fn tag(self) -> &'static str {
        match self {
            SectionKind::Code => "CODE",
            SectionKind::Commands => "COMMANDS",
        }
    }

    /// Match a tag name, case-insensitively.
    pub fn from_tag(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("CODE") {
            Some(SectionKind::Code)
        } else if name.eq_ignore_ascii_case("COMMANDS") {
            Some(SectionKind::Commands)
        } else {
            None
        }
    }

    /// `</KIND>`.
    pub fn close_tag(self) -> String {
        format!("</{}>", self.tag())
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One body line of a tagged section, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyLine {
    /// Line text, untouched.
    pub text: String,
    /// Source span of `text`.
    pub span: Span,
}

/// A piece of a script, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Section {
    /// Untagged text between sections, trimmed. Typed verbatim.
    Text {
        /// Trimmed content.
        content: String,
        /// Source span of the lines it came from.
        span: Span,
    },
    /// A `<CODE>` section.
    Code {
        /// Upper-cased tool name from the open tag.
        #[serde(skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
        /// Body lines with leading and trailing blank lines removed.
        lines: Vec<BodyLine>,
        /// Open tag through close tag (or end of input).
        span: Span,
    },
    /// A `<COMMANDS>` section.
    Commands {
        /// Upper-cased tool name from the open tag.
        #[serde(skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
        /// Body lines with leading and trailing blank lines removed.
        lines: Vec<BodyLine>,
        /// Open tag through close tag (or end of input).
        span: Span,
    },
}

impl Section {
    /// Build a tagged section of the given kind.
    pub fn tagged(kind: SectionKind, tool: Option<String>, lines: Vec<BodyLine>, span: Span) -> Self {
        match kind {
            SectionKind::Code => Section::Code { tool, lines, span },
            SectionKind::Commands => Section::Commands { tool, lines, span },
        }
    }

    /// Kind of a tagged section; `None` for text.
    pub fn kind(&self) -> Option<SectionKind> {
        match self {
            Section::Text { .. } => None,
            Section::Code { .. } => Some(SectionKind::Code),
            Section::Commands { .. } => Some(SectionKind::Commands),
        }
    }

    /// Tool name, if the section was tagged with one.
    pub fn tool(&self) -> Option<&str> {
        match self {
            Section::Text { .. } => None,
            Section::Code { tool, .. } | Section::Commands { tool, .. } => tool.as_deref(),
        }
    }

    /// Body lines of a tagged section; empty for text.
    pub fn lines(&self) -> &[BodyLine] {
        match self {
            Section::Text { .. } => &[],
            Section::Code { lines, .. } | Section::Commands { lines, .. } => lines,
        }
    }

    /// Source span.
    pub fn span(&self) -> Span {
        match self {
            Section::Text { span, .. }
            | Section::Code { span, .. }
            | Section::Commands { span, .. } => *span,
        }
    }

    /// Raw content: the text, or the body lines joined with `\n`.
    pub fn content(&self) -> String {
        match self {
            Section::Text { content, .. } => content.clone(),
            Section::Code { lines, .. } | Section::Commands { lines, .. } => lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
