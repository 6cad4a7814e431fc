use chrono::{DateTime, Utc};
use std::fmt;

/// The view of a log event that a [`Renderer`](crate::render::Renderer)
/// needs. Implemented by [`LogRecord`] and by any event type of the
/// surrounding logging facility.
pub trait LogEvent {
    /// Logger name substituted for `%c`.
    fn logger_name(&self) -> &str;

    /// Event time substituted for `%d{..}`.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Level ordinal, an index into [`LevelNames`](crate::level::LevelNames).
    fn level(&self) -> usize;

    /// Value whose `Display` output is substituted for `%m`.
    fn payload(&self) -> &dyn fmt::Display;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord<P = String> {
    pub logger_name: String,
    pub timestamp: DateTime<Utc>,
    pub level: usize,
    pub payload: P,
}

impl<P: fmt::Display> LogRecord<P> {
    /// Build a record stamped with the current time.
    pub fn now(logger_name: impl Into<String>, level: usize, payload: P) -> Self {
        LogRecord { logger_name: logger_name.into(), timestamp: Utc::now(), level, payload }
    }
}

impl<P: fmt::Display> LogEvent for LogRecord<P> {
    fn logger_name(&self) -> &str {
        &self.logger_name
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn level(&self) -> usize {
        self.level
    }

    fn payload(&self) -> &dyn fmt::Display {
        &self.payload
    }
}
