//! Data models module
//!
//! Defines core data structures like NormalizedEvent and Alert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized log event fed into the detection pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Tag of the producing source (e.g. "ssh", "firewall", "demo")
    pub source: String,
    /// Inferred log level
    pub level: LogLevel,
    /// Free-text message; always present, may be empty
    pub message: String,
    /// Source IP in dotted-quad form, when one could be extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Username, when one could be extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Original unmodified log line
    pub raw_log: String,
    /// Event timestamp; defaults to processing time at ingestion
    pub timestamp: DateTime<Utc>,
}

/// Log levels recognized by the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Critical,
}

/// Alert structure for detection hits
///
/// Immutable once created; only detectors construct these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Which detector fired
    pub alert_type: AlertType,
    /// Alert severity
    pub severity: AlertSeverity,
    /// Human-readable summary
    pub description: String,
    /// Attributed source IP; may be "Unknown" or absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    /// Structured payload specific to the alert type
    pub details: Map<String, Value>,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

/// Alert categories, one per detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    BruteForce,
    PortScan,
    SqlInjection,
    SuspiciousCommand,
    UnauthorizedAccess,
}

/// Alert severity levels, ordered LOW < MEDIUM < HIGH < CRITICAL
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Aggregate threat level computed from recent alert history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreatLevel::Low => "LOW",
            ThreatLevel::Medium => "MEDIUM",
            ThreatLevel::High => "HIGH",
            ThreatLevel::Critical => "CRITICAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> NormalizedEvent {
        NormalizedEvent {
            source: "test".to_string(),
            level: LogLevel::Error,
            message: "failed password for root from 10.0.0.7".to_string(),
            ip_address: Some("10.0.0.7".to_string()),
            user: Some("root".to_string()),
            raw_log: "failed password for root from 10.0.0.7".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn severity_ordering() {
        assert!(AlertSeverity::Critical > AlertSeverity::High);
        assert!(AlertSeverity::High > AlertSeverity::Medium);
        assert!(AlertSeverity::Medium > AlertSeverity::Low);
    }

    #[test]
    fn alert_serializes_with_wire_names() {
        let alert = Alert {
            alert_type: AlertType::BruteForce,
            severity: AlertSeverity::High,
            description: "test".to_string(),
            source_ip: Some("10.0.0.7".to_string()),
            details: Map::new(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("BRUTE_FORCE"));
        assert!(json.contains("HIGH"));
    }

    #[test]
    fn event_roundtrips_through_json() {
        let event = sample_event();
        let json = serde_json::to_string(&event).unwrap();
        let back: NormalizedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, event.message);
        assert_eq!(back.level, LogLevel::Error);
        assert_eq!(back.ip_address.as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let mut event = sample_event();
        event.ip_address = None;
        event.user = None;
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("ip_address"));
        assert!(!json.contains("user"));
    }
}
