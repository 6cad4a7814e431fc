use crate::event::LogEvent;
use crate::layout::{Piece, Template};
use crate::level::LevelNames;
use std::fmt::Write;

/// Name rendered for `%p` when an event's level ordinal is outside the
/// level-name table.
pub const DEFAULT_UNKNOWN_LEVEL: &str = "UNKNOWN";

const INITIAL_CAPACITY: usize = 64;

/// Renders compiled [`Template`]s against [`LogEvent`]s.
///
/// Holds the level-name table used for `%p`. Rendering never mutates the
/// renderer, the template or the event, so a single renderer can be shared
/// by any number of threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    levels: LevelNames,
    unknown_level: String,
}

impl Renderer {
    pub fn new(levels: LevelNames) -> Self {
        Renderer { levels, unknown_level: DEFAULT_UNKNOWN_LEVEL.to_string() }
    }

    /// Override the name printed for out-of-range level ordinals.
    pub fn with_unknown_level(mut self, name: impl Into<String>) -> Self {
        self.unknown_level = name.into();
        self
    }

    pub fn levels(&self) -> &LevelNames {
        &self.levels
    }

    pub fn unknown_level(&self) -> &str {
        &self.unknown_level
    }

    /// Display name for a level ordinal, falling back to the unknown-level
    /// name when the table has no entry for it.
    pub fn level_name(&self, ordinal: usize) -> &str {
        self.levels.name(ordinal).unwrap_or(&self.unknown_level)
    }

    pub fn render<E>(&self, event: &E, template: &Template) -> String
    where
        E: LogEvent + ?Sized,
    {
        let mut out = String::with_capacity(INITIAL_CAPACITY);
        self.render_into(event, template, &mut out);
        out
    }

    /// Append the rendered line to `out` instead of allocating a new one.
    ///
    /// If chrono fails to format a `%d{..}` piece, the partial output of that
    /// piece is discarded and the timestamp is written as RFC 3339 instead.
    /// Compiled templates only hold patterns that format successfully.
    /// If a payload's `Display` fails for `%m`, whatever it wrote before
    /// failing is kept and rendering continues with the next piece.
    pub fn render_into<E>(&self, event: &E, template: &Template, out: &mut String)
    where
        E: LogEvent + ?Sized,
    {
        for piece in template {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::LoggerName => out.push_str(event.logger_name()),
                Piece::Timestamp(format) => {
                    let timestamp = event.timestamp();
                    let mark = out.len();
                    if write!(out, "{}", timestamp.format(format)).is_err() {
                        out.truncate(mark);
                        out.push_str(&timestamp.to_rfc3339());
                    }
                }
                Piece::Level => out.push_str(self.level_name(event.level())),
                Piece::Message => {
                    let _ = write!(out, "{}", event.payload());
                }
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new(LevelNames::default())
    }
}
