//! Threat detection module
//!
//! A fixed, ordered set of detectors inspects each normalized event; each
//! detector emits at most one alert. Stateful detectors (brute force, port
//! scan) keep per-source sliding windows; the rest are pure pattern scans.

mod brute_force;
mod pipeline;
mod port_scan;
mod sql_injection;
mod suspicious_command;
mod unauthorized_access;

pub use brute_force::BruteForceDetector;
pub use pipeline::DetectionPipeline;
pub use port_scan::PortScanDetector;
pub use sql_injection::SqlInjectionDetector;
pub use suspicious_command::SuspiciousCommandDetector;
pub use unauthorized_access::UnauthorizedAccessDetector;

use crate::models::{Alert, NormalizedEvent};
use chrono::{DateTime, Utc};

/// A unit of detection logic: inspects one event, may emit zero or one alert.
///
/// Time is supplied by the caller so window trimming and trigger checks stay
/// deterministic under test.
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;
    fn inspect(&self, event: &NormalizedEvent, now: DateTime<Utc>) -> Option<Alert>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{LogLevel, NormalizedEvent};
    use chrono::{DateTime, Utc};

    pub fn event(message: &str, ip: Option<&str>, timestamp: DateTime<Utc>) -> NormalizedEvent {
        NormalizedEvent {
            source: "test".to_string(),
            level: LogLevel::Info,
            message: message.to_string(),
            ip_address: ip.map(str::to_string),
            user: None,
            raw_log: message.to_string(),
            timestamp,
        }
    }

    pub fn base_time() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().unwrap()
    }
}
