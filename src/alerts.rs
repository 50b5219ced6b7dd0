//! Alert sink for NDJSON output.
//!
//! Writes alerts as one JSON object per line through a non-blocking appender.

use crate::models::Alert;
use std::io::Write;
use tracing::warn;
use tracing_appender::non_blocking::NonBlocking;

#[derive(Clone)]
pub struct AlertSink {
    writer: NonBlocking,
}

impl AlertSink {
    pub fn new(writer: NonBlocking) -> Self {
        Self { writer }
    }

    pub fn write_alert(&self, alert: &Alert) {
        match serde_json::to_string(alert) {
            Ok(line) => {
                let mut writer = self.writer.clone();
                if let Err(err) = writeln!(writer, "{}", line) {
                    warn!(error = %err, "Failed to write alert");
                }
            }
            Err(err) => {
                warn!(error = %err, "Failed to serialize alert");
            }
        }
    }
}
