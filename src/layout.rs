use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Write};
use std::str::FromStr;

/// Kind of a compiled [`Piece`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Literal,
    LoggerName,
    Timestamp,
    Level,
    Message,
}

/// A single fragment of a compiled [`Template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Text copied verbatim into the output. Never empty.
    Literal(String),
    /// `%c`
    LoggerName,
    /// `%d{FORMAT}`, holding the `strftime` pattern between the braces.
    Timestamp(String),
    /// `%p`
    Level,
    /// `%m`
    Message,
}

impl Piece {
    pub fn kind(&self) -> PieceKind {
        match self {
            Piece::Literal(_) => PieceKind::Literal,
            Piece::LoggerName => PieceKind::LoggerName,
            Piece::Timestamp(_) => PieceKind::Timestamp,
            Piece::Level => PieceKind::Level,
            Piece::Message => PieceKind::Message,
        }
    }

    /// Literal text for [`Piece::Literal`], the date pattern for
    /// [`Piece::Timestamp`] and an empty string for everything else.
    pub fn payload(&self) -> &str {
        match self {
            Piece::Literal(text) | Piece::Timestamp(text) => text,
            Piece::LoggerName | Piece::Level | Piece::Message => "",
        }
    }
}

/// Error returned when a layout string does not follow the layout grammar.
///
/// Offsets are byte offsets into the layout string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unknown layout identifier `{identifier}` at offset {offset}")]
    UnknownIdentifier { identifier: char, offset: usize },

    #[error("%d must be followed by a date format in braces like %d{{...}}, but found `{found}` at offset {offset}")]
    MissingDateFormat { found: char, offset: usize },

    #[error("unterminated placeholder: expected {expected} at offset {offset}")]
    Unterminated { expected: &'static str, offset: usize },

    #[error("invalid date format `{format}` at offset {offset}")]
    InvalidDateFormat { format: String, offset: usize },
}

pub type LayoutResult<T> = Result<T, CompileError>;

/// Ordered, immutable sequence of [`Piece`]s compiled from a layout string.
///
/// Pieces are rendered left to right. A compiled template never contains
/// an empty [`Piece::Literal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Piece> {
        self.pieces.iter()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Build a template without going through [`compile`].
    #[cfg(test)]
    pub(crate) fn from_pieces(pieces: Vec<Piece>) -> Self {
        Template { pieces }
    }
}

impl<'a> IntoIterator for &'a Template {
    type Item = &'a Piece;
    type IntoIter = std::slice::Iter<'a, Piece>;

    fn into_iter(self) -> Self::IntoIter {
        self.pieces.iter()
    }
}

/// Writes the canonical layout string for this template. Compiling the
/// output yields an equal template.
impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => {
                    for part in text.split_inclusive('%') {
                        f.write_str(part)?;
                        if part.ends_with('%') {
                            f.write_str("%")?;
                        }
                    }
                }
                Piece::LoggerName => f.write_str("%c")?,
                Piece::Timestamp(format) => write!(f, "%d{{{}}}", format)?,
                Piece::Level => f.write_str("%p")?,
                Piece::Message => f.write_str("%m")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Template {
    type Err = CompileError;

    fn from_str(layout: &str) -> Result<Self, Self::Err> {
        compile(layout)
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let layout = String::deserialize(deserializer)?;
        compile(&layout).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    AfterPercent,
    DateExpectOpenBrace,
    /// `start` is the byte offset just past the opening `{`.
    InsideDateFormat { start: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    None,
    PushLiteral(char),
    Emit(Piece),
    EmitTimestamp { start: usize, end: usize },
}

impl State {
    /// Advance the machine by one character found at byte offset `at`.
    fn step(self, at: usize, ch: char) -> LayoutResult<(State, Action)> {
        let next = match self {
            State::Text if ch == '%' => (State::AfterPercent, Action::None),
            State::Text => (State::Text, Action::PushLiteral(ch)),
            State::AfterPercent => match ch {
                'c' => (State::Text, Action::Emit(Piece::LoggerName)),
                'd' => (State::DateExpectOpenBrace, Action::None),
                'p' => (State::Text, Action::Emit(Piece::Level)),
                'm' => (State::Text, Action::Emit(Piece::Message)),
                '%' => (State::Text, Action::PushLiteral('%')),
                other => {
                    return Err(CompileError::UnknownIdentifier { identifier: other, offset: at })
                }
            },
            State::DateExpectOpenBrace if ch == '{' => {
                (State::InsideDateFormat { start: at + ch.len_utf8() }, Action::None)
            }
            State::DateExpectOpenBrace => {
                return Err(CompileError::MissingDateFormat { found: ch, offset: at })
            }
            State::InsideDateFormat { start } if ch == '}' => {
                (State::Text, Action::EmitTimestamp { start, end: at })
            }
            inside @ State::InsideDateFormat { .. } => (inside, Action::None),
        };
        Ok(next)
    }

    /// What the machine still expected when input ended, if anything.
    fn pending(self) -> Option<&'static str> {
        match self {
            State::Text => None,
            State::AfterPercent => Some("a placeholder identifier after `%`"),
            State::DateExpectOpenBrace => Some("`{` after %d"),
            State::InsideDateFormat { .. } => Some("`}` closing the %d date format"),
        }
    }
}

/// Compile a layout string into a [`Template`].
///
/// Recognized placeholders:
/// - `%c` logger name
/// - `%d{FORMAT}` event timestamp, `FORMAT` is a chrono `strftime` pattern
///   such as `%Y-%m-%d %H:%M:%S`
/// - `%p` level name
/// - `%m` message
/// - `%%` a literal `%`
///
/// Any grammar violation fails the whole compilation.
pub fn compile(layout: &str) -> LayoutResult<Template> {
    match compile_pieces(layout) {
        Ok(pieces) => {
            tracing::debug!(layout, pieces = pieces.len(), "compiled log layout");
            Ok(Template { pieces })
        }
        Err(err) => {
            tracing::debug!(layout, error = %err, "failed to compile log layout");
            Err(err)
        }
    }
}

fn compile_pieces(layout: &str) -> LayoutResult<Vec<Piece>> {
    let mut pieces = Vec::with_capacity(10);
    let mut literal = String::new();
    let mut state = State::Text;

    for (at, ch) in layout.char_indices() {
        let (next, action) = state.step(at, ch)?;
        match action {
            Action::None => {}
            Action::PushLiteral(ch) => literal.push(ch),
            Action::Emit(piece) => {
                flush_literal(&mut literal, &mut pieces);
                pieces.push(piece);
            }
            Action::EmitTimestamp { start, end } => {
                let format = &layout[start..end];
                validate_date_format(format, start)?;
                flush_literal(&mut literal, &mut pieces);
                pieces.push(Piece::Timestamp(format.to_string()));
            }
        }
        state = next;
    }

    if let Some(expected) = state.pending() {
        return Err(CompileError::Unterminated { expected, offset: layout.len() });
    }

    flush_literal(&mut literal, &mut pieces);
    Ok(pieces)
}

fn flush_literal(literal: &mut String, pieces: &mut Vec<Piece>) {
    if !literal.is_empty() {
        pieces.push(Piece::Literal(std::mem::take(literal)));
    }
}

/// Reject patterns chrono cannot parse, and patterns it parses but cannot
/// format (such as the parse-only `%#z`).
fn validate_date_format(format: &str, offset: usize) -> LayoutResult<()> {
    let items = StrftimeItems::new(format);
    let parses = !items.clone().any(|item| matches!(item, Item::Error));
    let sample = DateTime::<Utc>::UNIX_EPOCH;
    if !parses || write!(String::new(), "{}", sample.format_with_items(items)).is_err() {
        return Err(CompileError::InvalidDateFormat { format: format.to_string(), offset });
    }
    Ok(())
}
