//! SQL-injection detector.
//!
//! Stateless scan of the message against an ordered signature list. Only the
//! first matching signature is reported, even when several are present.

use super::Detector;
use crate::models::{Alert, AlertSeverity, AlertType, NormalizedEvent};
use crate::utils::{truncate_message, IPV4_REGEX};
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde_json::Map;
use std::sync::LazyLock;

/// Signature patterns checked in order; the pattern source string is carried
/// into the alert details verbatim.
const SQL_PATTERNS: [&str; 12] = [
    r"union.*select",
    r"select.*from.*where",
    r"drop\s+table",
    r"insert\s+into",
    r"delete\s+from",
    r"update.*set",
    r"or\s+1\s*=\s*1",
    r";\s*--",
    r"xp_cmdshell",
    r"exec\s+sp_",
    r"cast\s*\(",
    r"convert\s*\(",
];

static COMPILED: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SQL_PATTERNS
        .iter()
        .map(|pattern| {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("SQL signature pattern is valid");
            (*pattern, regex)
        })
        .collect()
});

#[derive(Default)]
pub struct SqlInjectionDetector;

impl SqlInjectionDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for SqlInjectionDetector {
    fn name(&self) -> &'static str {
        "sql_injection"
    }

    fn inspect(&self, event: &NormalizedEvent, now: DateTime<Utc>) -> Option<Alert> {
        let (pattern, _) = COMPILED
            .iter()
            .find(|(_, regex)| regex.is_match(&event.message))?;

        // Attribute to an IP literal inside the message when present.
        let source_ip = IPV4_REGEX
            .find(&event.message)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let mut details = Map::new();
        details.insert("pattern".to_string(), (*pattern).into());
        details.insert(
            "message".to_string(),
            truncate_message(&event.message, 200).into(),
        );

        Some(Alert {
            alert_type: AlertType::SqlInjection,
            severity: AlertSeverity::Critical,
            description: "SQL injection attempt detected".to_string(),
            source_ip: Some(source_ip),
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
    fn union_select_matches_any_case() {
        let detector = SqlInjectionDetector::new();
        let t0 = base_time();
        let ev = event("query: ' UNION SELECT * FROM users", None, t0);
        let alert = detector.inspect(&ev, t0).unwrap();
        assert_eq!(alert.alert_type, AlertType::SqlInjection);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.details["pattern"], r"union.*select");
    }

    #[test]
    fn first_matching_signature_wins() {
        let detector = SqlInjectionDetector::new();
        let t0 = base_time();
        // Matches both the union+select and tautology signatures; only the
        // earlier one in the list is reported.
        let ev = event("UNION SELECT id FROM t WHERE 1 OR 1=1", None, t0);
        let alert = detector.inspect(&ev, t0).unwrap();
        assert_eq!(alert.details["pattern"], r"union.*select");
    }

    #[test]
    fn ip_literal_in_message_is_attributed() {
        let detector = SqlInjectionDetector::new();
        let t0 = base_time();
        let ev = event("blocked drop table users from 123.45.67.89", None, t0);
        let alert = detector.inspect(&ev, t0).unwrap();
        assert_eq!(alert.source_ip.as_deref(), Some("123.45.67.89"));
    }

    #[test]
    fn falls_back_to_unknown_without_ip() {
        let detector = SqlInjectionDetector::new();
        let t0 = base_time();
        let ev = event("suspicious: xp_cmdshell invoked", None, t0);
        let alert = detector.inspect(&ev, t0).unwrap();
        assert_eq!(alert.source_ip.as_deref(), Some("Unknown"));
    }

    #[test]
    fn message_detail_is_truncated() {
        let detector = SqlInjectionDetector::new();
        let t0 = base_time();
        let long = format!("or 1=1 {}", "x".repeat(500));
        let ev = event(&long, None, t0);
        let alert = detector.inspect(&ev, t0).unwrap();
        assert_eq!(alert.details["message"].as_str().unwrap().chars().count(), 200);
    }

    #[test]
    fn clean_messages_pass() {
        let detector = SqlInjectionDetector::new();
        let t0 = base_time();
        let ev = event("user selected a theme from preferences", None, t0);
        assert!(detector.inspect(&ev, t0).is_none());
        let ev = event("", None, t0);
        assert!(detector.inspect(&ev, t0).is_none());
    }
}
