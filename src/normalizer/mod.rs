//! Log line normalizer.
//!
//! Converts raw log lines into normalized events: extracts the first IP
//! literal, infers a log level from well-known keywords, and pulls a
//! username out of common auth log formats.

use crate::models::{LogLevel, NormalizedEvent};
use crate::utils::IPV4_REGEX;
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Username extraction patterns, tried in order
static USER_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"user[=:\s]+(\w+)",
        r"username[=:\s]+(\w+)",
        r"login[=:\s]+(\w+)",
        r"for\s+(\w+)@",
    ]
    .iter()
    .map(|pattern| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("user pattern is valid")
    })
    .collect()
});

/// Parse a raw log line into a normalized event stamped with `now`
pub fn parse_line(line: &str, source: &str, now: DateTime<Utc>) -> NormalizedEvent {
    let ip_address = IPV4_REGEX.find(line).map(|m| m.as_str().to_string());

    let user = USER_REGEXES
        .iter()
        .find_map(|regex| regex.captures(line))
        .map(|caps| caps[1].to_string());

    NormalizedEvent {
        source: source.to_string(),
        level: infer_level(line),
        message: line.trim().to_string(),
        ip_address,
        user,
        raw_log: line.to_string(),
        timestamp: now,
    }
}

/// Keyword-based level inference; "error"/"fail" take precedence over
/// "critical"/"fatal" (matching the upstream log sources this was tuned on).
fn infer_level(line: &str) -> LogLevel {
    let lower = line.to_lowercase();
    if lower.contains("error") || lower.contains("fail") {
        LogLevel::Error
    } else if lower.contains("warn") {
        LogLevel::Warning
    } else if lower.contains("critical") || lower.contains("fatal") {
        LogLevel::Critical
    } else {
        LogLevel::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn extracts_ip_and_user() {
        let event = parse_line(
            "WARNING: Invalid user admin from 192.168.1.99",
            "ssh",
            now(),
        );
        assert_eq!(event.ip_address.as_deref(), Some("192.168.1.99"));
        assert_eq!(event.user.as_deref(), Some("admin"));
        assert_eq!(event.level, LogLevel::Warning);
        assert_eq!(event.source, "ssh");
    }

    #[test]
    fn user_is_absent_when_no_pattern_matches() {
        let event = parse_line(
            "ERROR: Failed password for admin from 192.168.1.99",
            "ssh",
            now(),
        );
        // "for <name>@" needs the at-sign; no other pattern applies here.
        assert!(event.user.is_none());
        assert_eq!(event.level, LogLevel::Error);
    }

    #[test]
    fn user_key_value_formats() {
        for line in ["login as user=alice ok", "username: alice", "login:alice"] {
            let event = parse_line(line, "test", now());
            assert_eq!(event.user.as_deref(), Some("alice"), "line: {line}");
        }
        let event = parse_line("session opened for bob@host", "test", now());
        assert_eq!(event.user.as_deref(), Some("bob"));
    }

    #[test]
    fn level_inference_order() {
        assert_eq!(parse_line("all good", "t", now()).level, LogLevel::Info);
        assert_eq!(
            parse_line("WARNING: disk usage at 80%", "t", now()).level,
            LogLevel::Warning
        );
        assert_eq!(
            parse_line("CRITICAL: kernel panic", "t", now()).level,
            LogLevel::Critical
        );
        // "fatal error" carries both keywords; "error" wins.
        assert_eq!(
            parse_line("fatal error in module", "t", now()).level,
            LogLevel::Error
        );
    }

    #[test]
    fn message_is_trimmed_raw_is_not() {
        let event = parse_line("  spaced out  \n", "t", now());
        assert_eq!(event.message, "spaced out");
        assert_eq!(event.raw_log, "  spaced out  \n");
    }

    #[test]
    fn empty_line_yields_empty_message() {
        let event = parse_line("", "t", now());
        assert_eq!(event.message, "");
        assert!(event.ip_address.is_none());
        assert!(event.user.is_none());
    }
}
