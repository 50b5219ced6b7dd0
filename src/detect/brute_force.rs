//! Brute-force login detector.
//!
//! Tracks failed authentication attempts per source IP in a sliding window
//! and fires once the retained count reaches the threshold.

use super::Detector;
use crate::models::{Alert, AlertSeverity, AlertType, NormalizedEvent};
use crate::state::WindowStore;
use chrono::{DateTime, Duration, Utc};
use serde_json::Map;

/// Message fragments that count as a failed authentication attempt
const FAIL_PATTERNS: [&str; 6] = [
    "failed password",
    "authentication failure",
    "invalid user",
    "failed login",
    "access denied",
    "incorrect password",
];

pub struct BruteForceDetector {
    attempts: WindowStore<()>,
    window: Duration,
    threshold: usize,
}

impl BruteForceDetector {
    pub fn new(window: Duration, threshold: usize, shards: usize) -> Self {
        Self {
            attempts: WindowStore::with_shards(window, shards),
            window,
            threshold,
        }
    }
}

impl Detector for BruteForceDetector {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    fn inspect(&self, event: &NormalizedEvent, now: DateTime<Utc>) -> Option<Alert> {
        // No source IP means the attempt cannot be attributed; skip entirely
        // without touching the window store.
        let ip = event.ip_address.as_deref()?;

        let message = event.message.to_lowercase();
        if !FAIL_PATTERNS.iter().any(|p| message.contains(p)) {
            return None;
        }

        // Append + threshold check + reset are atomic per IP, so a burst
        // produces exactly one alert and the next one needs a fresh run.
        let threshold = self.threshold;
        let attempts = self
            .attempts
            .record_and_trigger(ip, (), now, |entries| {
                (entries.len() >= threshold).then(|| entries.len())
            })?;

        let mut details = Map::new();
        details.insert("attempts".to_string(), attempts.into());

        Some(Alert {
            alert_type: AlertType::BruteForce,
            severity: AlertSeverity::High,
            description: format!(
                "Brute force detected: {} failed attempts in {} minutes",
                attempts,
                self.window.num_minutes()
            ),
            source_ip: Some(ip.to_string()),
            details,
            timestamp: now,
        })
    }
}
