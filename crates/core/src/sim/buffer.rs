//! Line-based text buffer and cursor for the interpreter.
//!
//! Columns count `char`s, not bytes.

use serde::{Deserialize, Serialize};

/// Cursor position: 0-indexed line and column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    /// Line index.
    pub line: usize,
    /// Column, in chars.
    pub column: usize,
}

impl Cursor {
    /// Cursor at `(line, column)`.
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Ordered lines; never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

fn byte_at(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or(line.len(), |(i, _)| i)
}

impl TextBuffer {
    /// One empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Number of lines (at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the last line.
    pub fn last_line(&self) -> usize {
        self.lines.len() - 1
    }

    /// Length of `line` in chars; 0 past the end.
    pub fn line_len(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |l| l.chars().count())
    }

    /// All lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consume into the line vector.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Insert `text` at `at`. `at` must be in bounds.
    pub fn insert_str(&mut self, at: Cursor, text: &str) {
        let line = &mut self.lines[at.line];
        let i = byte_at(line, at.column);
        line.insert_str(i, text);
    }

    /// Split `at.line` at `at.column`; the tail becomes the next line.
    pub fn split_line(&mut self, at: Cursor) {
        let line = &mut self.lines[at.line];
        let i = byte_at(line, at.column);
        let rest = line.split_off(i);
        self.lines.insert(at.line + 1, rest);
    }

    /// Delete backward from `at`, returning the new cursor.
    ///
    /// At column 0 the line joins onto the previous one; at (0, 0) nothing
    /// changes.
    pub fn backspace(&mut self, at: Cursor) -> Cursor {
        if at.column > 0 {
            let line = &mut self.lines[at.line];
            let i = byte_at(line, at.column - 1);
            line.remove(i);
            Cursor::new(at.line, at.column - 1)
        } else if at.line > 0 {
            let current = self.lines.remove(at.line);
            let prev = &mut self.lines[at.line - 1];
            let column = prev.chars().count();
            prev.push_str(&current);
            Cursor::new(at.line - 1, column)
        } else {
            at
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
