//! Unauthorized-access detector.
//!
//! Stateless scan for access-control failure phrases. First match wins.

use super::Detector;
use crate::models::{Alert, AlertSeverity, AlertType, NormalizedEvent};
use chrono::{DateTime, Utc};
use serde_json::Map;

const UNAUTHORIZED_PATTERNS: [&str; 7] = [
    "unauthorized access",
    "permission denied",
    "access forbidden",
    "not authorized",
    "invalid token",
    "session expired",
    "invalid api key",
];

#[derive(Default)]
pub struct UnauthorizedAccessDetector;

impl UnauthorizedAccessDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for UnauthorizedAccessDetector {
    fn name(&self) -> &'static str {
        "unauthorized_access"
    }

    fn inspect(&self, event: &NormalizedEvent, now: DateTime<Utc>) -> Option<Alert> {
        let message = event.message.to_lowercase();
        let pattern = UNAUTHORIZED_PATTERNS
            .iter()
            .find(|p| message.contains(*p))?;

        let mut details = Map::new();
        details.insert("pattern".to_string(), (*pattern).into());

        Some(Alert {
            alert_type: AlertType::UnauthorizedAccess,
            severity: AlertSeverity::Medium,
            description: "Unauthorized access attempt detected".to_string(),
            source_ip: event.ip_address.clone(),
            details,
            timestamp: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::{base_time, event};

    #[test]
    fn access_phrase_fires() {
        let detector = UnauthorizedAccessDetector::new();
        let t0 = base_time();
        let ev = event(
            "Unauthorized access attempt from 8.8.8.8",
            Some("8.8.8.8"),
            t0,
        );
        let alert = detector.inspect(&ev, t0).unwrap();
        assert_eq!(alert.alert_type, AlertType::UnauthorizedAccess);
        assert_eq!(alert.severity, AlertSeverity::Medium);
        assert_eq!(alert.details["pattern"], "unauthorized access");
        assert_eq!(alert.source_ip.as_deref(), Some("8.8.8.8"));
    }

    #[test]
    fn token_and_session_phrases_fire() {
        let detector = UnauthorizedAccessDetector::new();
        let t0 = base_time();
        for message in ["API call rejected: invalid token", "session expired for bob"] {
            let alert = detector.inspect(&event(message, None, t0), t0).unwrap();
            assert_eq!(alert.alert_type, AlertType::UnauthorizedAccess);
        }
    }

    #[test]
    fn clean_messages_pass() {
        let detector = UnauthorizedAccessDetector::new();
        let t0 = base_time();
        let ev = event("user alice granted access to reports", None, t0);
        assert!(detector.inspect(&ev, t0).is_none());
    }
}
