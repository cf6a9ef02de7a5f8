//! Buffer interpreter.
//!
//! [`simulate`] replays a canonical stream against an empty buffer and
//! returns the resulting lines and cursor. It is the only interpreter:
//! full preview, partial preview, the CLI and the tests all go through it.

/// Text buffer and cursor types.
pub mod buffer;

pub use buffer::{Cursor, TextBuffer};

use keyscript_stream::{Directive, Unit, decode};
use serde::{Deserialize, Serialize};

/// Default cursor glyph used by [`Simulation::render`].
pub const DEFAULT_CURSOR_MARKER: char = '│';

/// Interpreter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Spaces inserted per tab.
    pub tab_width: usize,
    /// Lines moved by page up / page down.
    pub page_size: usize,
    /// Glyph inserted at the cursor when rendering.
    pub cursor_marker: char,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            page_size: 10,
            cursor_marker: DEFAULT_CURSOR_MARKER,
        }
    }
}

/// Final buffer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    /// Buffer lines; at least one.
    pub lines: Vec<String>,
    /// Cursor, always in bounds.
    pub cursor: Cursor,
}

impl Simulation {
    /// Lines with `marker` inserted at the cursor.
    ///
    /// Empty lines after the cursor line at the end of the buffer are
    /// dropped. This only affects presentation.
    pub fn render(&self, marker: char) -> Vec<String> {
        let mut out = self.lines.clone();
        if let Some(line) = out.get_mut(self.cursor.line) {
            let i = line
                .char_indices()
                .nth(self.cursor.column)
                .map_or(line.len(), |(i, _)| i);
            line.insert(i, marker);
        }
        while out.len() > self.cursor.line + 1 && out.last().is_some_and(String::is_empty) {
            out.pop();
        }
        out
    }

    /// Buffer content joined with `\n`, without a cursor.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Replay `stream` against an empty buffer.
pub fn simulate(stream: &str, config: &SimConfig) -> Simulation {
    let mut interp = Interpreter::new(config);
    for unit in decode(stream) {
        interp.apply(unit);
    }
    tracing::debug!(
        stream_len = stream.len(),
        lines = interp.buffer.line_count(),
        "simulated stream"
    );
    Simulation {
        lines: interp.buffer.into_lines(),
        cursor: interp.cursor,
    }
}

// ─── Interpreter ────────────────────────────────────────────────────────────

struct Interpreter<'c> {
    config: &'c SimConfig,
    buffer: TextBuffer,
    cursor: Cursor,
}

impl<'c> Interpreter<'c> {
    fn new(config: &'c SimConfig) -> Self {
        Self {
            config,
            buffer: TextBuffer::new(),
            cursor: Cursor::default(),
        }
    }

    fn apply(&mut self, unit: Unit) {
        match unit {
            Unit::Char(c) => {
                let mut tmp = [0u8; 4];
                self.buffer.insert_str(self.cursor, c.encode_utf8(&mut tmp));
                self.cursor.column += 1;
            }
            Unit::Tab => {
                let spaces = " ".repeat(self.config.tab_width);
                self.buffer.insert_str(self.cursor, &spaces);
                self.cursor.column += self.config.tab_width;
            }
            Unit::Newline => {
                self.buffer.split_line(self.cursor);
                self.cursor = Cursor::new(self.cursor.line + 1, 0);
            }
            Unit::Backspace => self.cursor = self.buffer.backspace(self.cursor),
            Unit::Directive(d) => self.navigate(d),
            Unit::Control(_) => {}
        }
    }

    fn navigate(&mut self, directive: Directive) {
        let Cursor { line, column } = self.cursor;
        let last = self.buffer.last_line();
        let len = |l: usize| self.buffer.line_len(l);

        self.cursor = match directive {
            Directive::Up => self.vertical(line.saturating_sub(1)),
            Directive::Down => self.vertical((line + 1).min(last)),
            Directive::PageUp => self.vertical(line.saturating_sub(self.config.page_size)),
            Directive::PageDown => {
                self.vertical(line.saturating_add(self.config.page_size).min(last))
            }
            Directive::Left if column > 0 => Cursor::new(line, column - 1),
            Directive::Left if line > 0 => Cursor::new(line - 1, len(line - 1)),
            Directive::Right if column < len(line) => Cursor::new(line, column + 1),
            Directive::Right if line < last => Cursor::new(line + 1, 0),
            Directive::Home => Cursor::new(line, 0),
            Directive::End => Cursor::new(line, len(line)),
            Directive::CtrlHome => Cursor::new(0, 0),
            Directive::CtrlEnd => Cursor::new(last, len(last)),
            _ => self.cursor,
        };
    }

    /// Move to `line`, keeping the column where the line allows.
    fn vertical(&self, line: usize) -> Cursor {
        Cursor::new(line, self.cursor.column.min(self.buffer.line_len(line)))
    }
}
