//! Aggregate threat scoring.
//!
//! Rolls recent alert history into a single threat level. Pure functions over
//! an alert sample; recomputed on demand, never cached.

use crate::models::{Alert, AlertSeverity, ThreatLevel};
use crate::store::AlertStore;
use std::sync::Arc;

/// How many recent alerts feed one score computation
pub const SCORE_SAMPLE: usize = 100;

/// Weighted severity score: 10 per CRITICAL, 5 per HIGH, 2 per MEDIUM.
/// LOW alerts do not contribute.
pub fn threat_score(alerts: &[Alert]) -> u32 {
    let critical = alerts
        .iter()
        .filter(|a| a.severity == AlertSeverity::Critical)
        .count() as u32;
    let high = alerts
        .iter()
        .filter(|a| a.severity == AlertSeverity::High)
        .count() as u32;
    let medium = alerts
        .iter()
        .filter(|a| a.severity == AlertSeverity::Medium)
        .count() as u32;

    critical * 10 + high * 5 + medium * 2
}

/// Map a score to a level by descending threshold
pub fn threat_level_for(score: u32) -> ThreatLevel {
    match score {
        s if s >= 50 => ThreatLevel::Critical,
        s if s >= 20 => ThreatLevel::High,
        s if s >= 10 => ThreatLevel::Medium,
        _ => ThreatLevel::Low,
    }
}

/// Reads recent alerts from the store and computes the aggregate level
pub struct ThreatScorer {
    store: Arc<dyn AlertStore>,
}

impl ThreatScorer {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    pub fn current_score(&self) -> u32 {
        threat_score(&self.store.recent_alerts(SCORE_SAMPLE))
    }

    pub fn current_level(&self) -> ThreatLevel {
        threat_level_for(self.current_score())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertType;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use serde_json::Map;

    fn alert(severity: AlertSeverity) -> Alert {
        Alert {
            alert_type: AlertType::SuspiciousCommand,
            severity,
            description: "test".to_string(),
            source_ip: None,
            details: Map::new(),
            timestamp: Utc::now(),
        }
    }

    fn sample(critical: usize, high: usize, medium: usize, low: usize) -> Vec<Alert> {
        let mut alerts = Vec::new();
        alerts.extend((0..critical).map(|_| alert(AlertSeverity::Critical)));
        alerts.extend((0..high).map(|_| alert(AlertSeverity::High)));
        alerts.extend((0..medium).map(|_| alert(AlertSeverity::Medium)));
        alerts.extend((0..low).map(|_| alert(AlertSeverity::Low)));
        alerts
    }

    #[test]
    fn weighted_score_matches_counts() {
        // 2 critical, 1 high, 3 medium = 20 + 5 + 6 = 31 -> HIGH.
        let alerts = sample(2, 1, 3, 0);
        assert_eq!(threat_score(&alerts), 31);
        assert_eq!(threat_level_for(31), ThreatLevel::High);
    }

    #[test]
    fn empty_sample_is_low() {
        assert_eq!(threat_score(&[]), 0);
        assert_eq!(threat_level_for(0), ThreatLevel::Low);
    }

    #[test]
    fn low_alerts_do_not_contribute() {
        let alerts = sample(0, 0, 0, 40);
        assert_eq!(threat_score(&alerts), 0);
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(threat_level_for(9), ThreatLevel::Low);
        assert_eq!(threat_level_for(10), ThreatLevel::Medium);
        assert_eq!(threat_level_for(20), ThreatLevel::High);
        assert_eq!(threat_level_for(50), ThreatLevel::Critical);
    }

    #[test]
    fn scorer_samples_the_store() {
        let store = Arc::new(MemoryStore::new());
        for a in sample(1, 2, 0, 0) {
            store.record(a).unwrap();
        }
        let scorer = ThreatScorer::new(store);
        assert_eq!(scorer.current_score(), 20);
        assert_eq!(scorer.current_level(), ThreatLevel::High);
    }
}
