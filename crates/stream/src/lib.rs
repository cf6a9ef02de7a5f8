//! Canonical keystroke stream encoding.
//!
//! A compiled script is a plain `String` in which a handful of control
//! characters carry editing intent. Every consumer (the keystroke dispatcher,
//! the buffer simulator, test harnesses) reads the stream through the same
//! [`Decoder`], so the encoding lives in exactly one place.
//!
//! | Unit              | Encoding                                   |
//! |-------------------|--------------------------------------------|
//! | arrow-mode enter  | [`ARROW_MODE`] followed by one directive code |
//! | newline           | [`NEWLINE`]                                |
//! | backspace         | [`BACKSPACE`]                              |
//! | tab               | [`TAB`]                                    |
//! | literal           | any other character                        |

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Encoding constants ──────────────────────────────────────────────────

/// Enters arrow mode: the next character is a [`Directive`] code (BEL).
pub const ARROW_MODE: char = '\u{7}';
/// Splits the current line (LF).
pub const NEWLINE: char = '\n';
/// Deletes the character left of the cursor (BS).
pub const BACKSPACE: char = '\u{8}';
/// Inserts a run of spaces (HT).
pub const TAB: char = '\t';

// ── Directives ──────────────────────────────────────────────────────────

/// A navigation or pass-through command consumed in arrow mode.
///
/// Pass-through directives (`ShiftPress`, `ShiftRelease`, `Escape`, `Pause`,
/// `Other`) mean something to a keystroke dispatcher but have no effect on a
/// simulated buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// Cursor up one line (`u`).
    Up,
    /// Cursor down one line (`d`).
    Down,
    /// Cursor left one column (`l`).
    Left,
    /// Cursor right one column (`r`).
    Right,
    /// Start of line (`b`).
    Home,
    /// End of line (`e`).
    End,
    /// Start of document (`B`).
    CtrlHome,
    /// End of document (`E`).
    CtrlEnd,
    /// Up one page (`U`).
    PageUp,
    /// Down one page (`D`).
    PageDown,
    /// Leave arrow mode without moving (`Q`).
    Exit,
    /// Hold shift (`s`).
    ShiftPress,
    /// Release shift (`S`).
    ShiftRelease,
    /// Escape key (`C`).
    Escape,
    /// Dispatcher pause (`z`).
    Pause,
    /// Tool-defined code with no buffer effect.
    Other(char),
}

impl Directive {
    /// Decode a directive from the character that follows [`ARROW_MODE`].
    pub fn from_code(code: char) -> Self {
        match code {
            'u' => Directive::Up,
            'd' => Directive::Down,
            'l' => Directive::Left,
            'r' => Directive::Right,
            'b' => Directive::Home,
            'e' => Directive::End,
            'B' => Directive::CtrlHome,
            'E' => Directive::CtrlEnd,
            'U' => Directive::PageUp,
            'D' => Directive::PageDown,
            'Q' => Directive::Exit,
            's' => Directive::ShiftPress,
            'S' => Directive::ShiftRelease,
            'C' => Directive::Escape,
            'z' => Directive::Pause,
            other => Directive::Other(other),
        }
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Directive::Other(c) => write!(f, "other({c:?})"),
            d => write!(f, "{d:?}"),
        }
    }
}

// ── Units ───────────────────────────────────────────────────────────────

/// One decoded element of a canonical stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Unit {
    /// A literal character to type.
    Char(char),
    /// Line break.
    Newline,
    /// Delete backward.
    Backspace,
    /// Tab key.
    Tab,
    /// Arrow-mode directive (the marker and its code, as one unit).
    Directive(Directive),
    /// Any other control character; carried through but has no buffer effect.
    Control(char),
}

// ── Decoder ─────────────────────────────────────────────────────────────

/// Decoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    /// Characters are literals or single-character control units.
    #[default]
    Normal,
    /// The next character is a directive code.
    ArrowMode,
}

/// Incremental stream decoder.
///
/// Feed characters one at a time with [`Decoder::feed`]; each call yields
/// at most one [`Unit`]. The arrow-mode marker yields nothing by itself: the
/// unit is produced when its directive code arrives.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    mode: Mode,
}

impl Decoder {
    /// A decoder in normal mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one character.
    pub fn feed(&mut self, c: char) -> Option<Unit> {
        match self.mode {
            Mode::ArrowMode => {
                self.mode = Mode::Normal;
                Some(Unit::Directive(Directive::from_code(c)))
            }
            Mode::Normal => match c {
                ARROW_MODE => {
                    self.mode = Mode::ArrowMode;
                    None
                }
                NEWLINE => Some(Unit::Newline),
                BACKSPACE => Some(Unit::Backspace),
                TAB => Some(Unit::Tab),
                c if c.is_control() => Some(Unit::Control(c)),
                c => Some(Unit::Char(c)),
            },
        }
    }
}

/// Iterator over the units of a stream. See [`decode`].
#[derive(Debug, Clone)]
pub struct Units<'a> {
    chars: std::str::Chars<'a>,
    decoder: Decoder,
}

impl Iterator for Units<'_> {
    type Item = Unit;

    fn next(&mut self) -> Option<Unit> {
        for c in self.chars.by_ref() {
            if let Some(unit) = self.decoder.feed(c) {
                return Some(unit);
            }
        }
        // A trailing marker with no code is dropped.
        None
    }
}

/// Decode a canonical stream into units.
pub fn decode(stream: &str) -> Units<'_> {
    Units {
        chars: stream.chars(),
        decoder: Decoder::new(),
    }
}

// ── Classification ──────────────────────────────────────────────────────

/// Whether a token sequence may be repeated by a command count.
///
/// Repeatable expansions are exactly one unit of directional movement,
/// delete-backward, line-break, or a dispatcher pause.
pub fn is_repeatable(tokens: &str) -> bool {
    let mut units = decode(tokens);
    let (Some(unit), None) = (units.next(), units.next()) else {
        return false;
    };
    matches!(
        unit,
        Unit::Newline
            | Unit::Backspace
            | Unit::Directive(
                Directive::Up
                    | Directive::Down
                    | Directive::Left
                    | Directive::Right
                    | Directive::Pause
            )
    )
}

// ── Validation ──────────────────────────────────────────────────────────

/// A structural problem in a token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The sequence ends with an arrow-mode marker and no directive code.
    #[error("arrow-mode marker at byte {offset} has no directive code")]
    DanglingArrowMarker {
        /// Byte offset of the marker.
        offset: usize,
    },
    /// The directive code after a marker is not a printable ASCII character.
    #[error("invalid directive code {code:?} at byte {offset}")]
    InvalidDirectiveCode {
        /// The offending code.
        code: char,
        /// Byte offset of the code.
        offset: usize,
    },
}

/// Check that every arrow-mode marker is followed by a printable ASCII code.
pub fn validate(tokens: &str) -> Result<(), StreamError> {
    let mut iter = tokens.char_indices();
    while let Some((offset, c)) = iter.next() {
        if c != ARROW_MODE {
            continue;
        }
        match iter.next() {
            None => return Err(StreamError::DanglingArrowMarker { offset }),
            Some((at, code)) if !code.is_ascii_graphic() => {
                return Err(StreamError::InvalidDirectiveCode { code, offset: at });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

// ── Escaped form ────────────────────────────────────────────────────────

/// Render a stream with its control characters written as backslash escapes
/// (`\a`, `\b`, `\n`, `\t`, `\\`, `\xNN`).
///
/// This is the form legacy stream files are written in.
pub fn escape(stream: &str) -> String {
    let mut out = String::with_capacity(stream.len());
    for c in stream.chars() {
        match c {
            ARROW_MODE => out.push_str("\\a"),
            BACKSPACE => out.push_str("\\b"),
            NEWLINE => out.push_str("\\n"),
            TAB => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            c if c.is_control() && (c as u32) < 0x100 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`].
///
/// Also accepts `\r`, `\'`, `\"`, `\uXXXX`, and `\u{X..}`. Unknown escapes
/// and malformed hex are kept verbatim.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(&next) = chars.peek() else {
            out.push('\\');
            break;
        };
        let simple = match next {
            'a' => Some(ARROW_MODE),
            'b' => Some(BACKSPACE),
            'n' => Some(NEWLINE),
            't' => Some(TAB),
            'r' => Some('\r'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            _ => None,
        };
        if let Some(decoded) = simple {
            chars.next();
            out.push(decoded);
            continue;
        }
        match next {
            'x' => {
                let rest: String = chars.clone().skip(1).take(2).collect();
                match parse_hex_char(&rest, 2) {
                    Some(decoded) => {
                        chars.nth(2);
                        out.push(decoded);
                    }
                    None => out.push('\\'),
                }
            }
            'u' => {
                let mut lookahead = chars.clone();
                lookahead.next();
                if lookahead.peek() == Some(&'{') {
                    lookahead.next();
                    let digits: String = lookahead
                        .clone()
                        .take_while(|c| *c != '}')
                        .take(7)
                        .collect();
                    let closed = lookahead.clone().nth(digits.chars().count()) == Some('}');
                    match parse_hex_char(&digits, digits.len()).filter(|_| closed) {
                        Some(decoded) => {
                            // 'u', '{', digits, '}'
                            chars.nth(digits.chars().count() + 2);
                            out.push(decoded);
                        }
                        None => out.push('\\'),
                    }
                } else {
                    let rest: String = lookahead.take(4).collect();
                    match parse_hex_char(&rest, 4) {
                        Some(decoded) => {
                            chars.nth(4);
                            out.push(decoded);
                        }
                        None => out.push('\\'),
                    }
                }
            }
            _ => out.push('\\'),
        }
    }
    out
}

fn parse_hex_char(digits: &str, expected_len: usize) -> Option<char> {
    if digits.is_empty() || digits.len() != expected_len {
        return None;
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
}
