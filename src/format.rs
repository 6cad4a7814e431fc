use crate::config::Layout;
use crate::event::LogRecord;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` event formatter that renders every event through a
/// compiled [`Layout`].
///
/// Install it with `tracing_subscriber::fmt().event_format(..)` or
/// `fmt::layer().event_format(..)`. The event target is used as the logger
/// name, the level is looked up in the layout's level table by name and
/// `%m` renders the event's [`EventPayload`]. Each event is written as one
/// line.
#[derive(Clone, Debug)]
pub struct LayoutFormat {
    layout: Arc<Layout>,
    clock: fn() -> DateTime<Utc>,
}

impl LayoutFormat {
    pub fn new(layout: Layout) -> Self {
        Self { layout: Arc::new(layout), clock: Utc::now }
    }

    /// Replace the time source used for `%d{..}`.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn record_for(&self, event: &Event<'_>) -> LogRecord<EventPayload> {
        let meta = event.metadata();
        let level = self
            .layout
            .renderer()
            .levels()
            .ordinal_of_level(*meta.level())
            // Out of range, rendered as the unknown-level name.
            .unwrap_or(usize::MAX);

        LogRecord {
            logger_name: meta.target().to_string(),
            timestamp: (self.clock)(),
            level,
            payload: EventPayload::from_event(event),
        }
    }
}

impl<S, N> FormatEvent<S, N> for LayoutFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let record = self.record_for(event);
        writer.write_str(&self.layout.render(&record))?;
        writeln!(writer)
    }
}

/// Message and structured fields of a `tracing` event.
///
/// Displays as the message followed by ` key=value` for every other field,
/// in key order. Values are written as JSON, so strings appear quoted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPayload {
    pub message: Option<String>,
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl EventPayload {
    pub fn from_event(event: &Event<'_>) -> Self {
        let mut payload = EventPayload::default();
        let mut visitor = FieldVisitor { fields: &mut payload.fields, message: &mut payload.message };
        event.record(&mut visitor);
        payload
    }
}

impl fmt::Display for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(message) = &self.message {
            f.write_str(message)?;
            first = false;
        }
        for (key, value) in &self.fields {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

struct FieldVisitor<'a> {
    fields: &'a mut BTreeMap<String, serde_json::Value>,
    message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        // Formatted messages (`info!("{}", x)`) arrive here as `fmt::Arguments`.
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}
