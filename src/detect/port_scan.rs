//! Port-scan detector.
//!
//! Extracts probed ports from connection-attempt messages and fires when one
//! source IP touches enough distinct ports inside the window.

use super::Detector;
use crate::models::{Alert, AlertSeverity, AlertType, NormalizedEvent};
use crate::state::WindowStore;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Matches "port <digits>" in a lowercased message
static PORT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"port (\d+)").expect("PORT_REGEX pattern is valid"));

pub struct PortScanDetector {
    probes: WindowStore<u16>,
    threshold: usize,
}

impl PortScanDetector {
    pub fn new(window: Duration, threshold: usize, shards: usize) -> Self {
        Self {
            probes: WindowStore::with_shards(window, shards),
            threshold,
        }
    }
}

impl Detector for PortScanDetector {
    fn name(&self) -> &'static str {
        "port_scan"
    }

    fn inspect(&self, event: &NormalizedEvent, now: DateTime<Utc>) -> Option<Alert> {
        let ip = event.ip_address.as_deref()?;

        let message = event.message.to_lowercase();
        let port: u16 = PORT_REGEX.captures(&message)?[1].parse().ok()?;
        if !message.contains("connection") && !message.contains("attempt") {
            return None;
        }

        // Distinct-port check and reset happen under the same per-IP lock.
        let threshold = self.threshold;
        let ports = self.probes.record_and_trigger(ip, port, now, |entries| {
            let distinct: BTreeSet<u16> = entries.iter().map(|(_, p)| *p).collect();
            (distinct.len() >= threshold).then_some(distinct)
        })?;

        let mut details = Map::new();
        details.insert(
            "ports".to_string(),
            Value::Array(ports.iter().map(|p| Value::from(*p)).collect()),
        );

        Some(Alert {
            alert_type: AlertType::PortScan,
            severity: AlertSeverity::Medium,
            description: format!("Port scan detected: {} distinct ports probed", ports.len()),
            source_ip: Some(ip.to_string()),
            details,
            timestamp: now,
        })
    }
}
