use std::io;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use similar_asserts::assert_eq;
use tracing::Level;
use tracing_log_layout::{LayoutConfig, LayoutFormat, LevelNames};

/// In-memory writer handed to the `fmt` subscriber.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
}

fn capture(config: LayoutConfig, emit: impl FnOnce()) -> String {
    let format = LayoutFormat::new(config.build().unwrap()).with_clock(fixed_clock);
    let captured = Captured::default();
    let writer = captured.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_writer(move || writer.clone())
        .event_format(format)
        .finish();
    tracing::subscriber::with_default(subscriber, emit);

    captured.contents()
}

#[test]
fn events_are_written_one_line_per_event_in_the_layout() {
    let output = capture(LayoutConfig::with_pattern("%d{%Y-%m-%dT%H:%M:%S} %p %c - %m"), || {
        tracing::info!(target: "app.db", rows = 3, "query done");
        tracing::error!(target: "app.http", "status {}", 503);
    });

    assert_eq!(
        output,
        "2024-01-02T03:04:05 INFO app.db - query done rows=3\n\
         2024-01-02T03:04:05 ERROR app.http - status 503\n"
    );
}

#[test]
fn structured_fields_follow_the_message() {
    let output = capture(LayoutConfig::with_pattern("%m"), || {
        tracing::warn!(user = "bob", retry = true, latency_ms = 12.5, "slow login");
    });

    assert_eq!(output, "slow login latency_ms=12.5 retry=true user=\"bob\"\n");
}

#[test]
fn levels_missing_from_the_table_render_the_fallback() {
    let config = LayoutConfig {
        pattern: "[%p] %m".to_string(),
        levels: LevelNames::new(["ERROR", "WARN", "INFO"]),
        unknown_level: "VERBOSE".to_string(),
    };
    let output = capture(config, || {
        tracing::info!("shown by name");
        tracing::trace!("not in the table");
    });

    assert_eq!(output, "[INFO] shown by name\n[VERBOSE] not in the table\n");
}

#[test]
fn literal_text_and_escapes_pass_through() {
    let output = capture(LayoutConfig::with_pattern("100%% %c"), || {
        tracing::debug!(target: "cpu", "ignored");
    });

    assert_eq!(output, "100% cpu\n");
}
