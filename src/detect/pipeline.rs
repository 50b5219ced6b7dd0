//! Detection pipeline.
//!
//! Runs the full detector set against each incoming event in a fixed order
//! and forwards every emitted alert to the alert store and NDJSON sink.

use super::{
    BruteForceDetector, Detector, PortScanDetector, SqlInjectionDetector,
    SuspiciousCommandDetector, UnauthorizedAccessDetector,
};
use crate::alerts::AlertSink;
use crate::config::DetectionConfig;
use crate::models::{Alert, NormalizedEvent};
use crate::store::AlertStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info};

const TARGET_ENGINE: &str = "engine";

/// Fixed ordered detector set; all per-source state lives in the detectors'
/// window stores, the pipeline itself is stateless.
pub struct DetectionPipeline {
    detectors: Vec<Box<dyn Detector>>,
    store: Arc<dyn AlertStore>,
    sink: Option<AlertSink>,
}

impl DetectionPipeline {
    pub fn new(cfg: &DetectionConfig, store: Arc<dyn AlertStore>) -> Self {
        let detectors: Vec<Box<dyn Detector>> = vec![
            Box::new(BruteForceDetector::new(
                Duration::seconds(cfg.brute_force_window_secs as i64),
                cfg.brute_force_threshold,
                cfg.window_shards,
            )),
            Box::new(PortScanDetector::new(
                Duration::seconds(cfg.port_scan_window_secs as i64),
                cfg.port_scan_threshold,
                cfg.window_shards,
            )),
            Box::new(SqlInjectionDetector::new()),
            Box::new(SuspiciousCommandDetector::new()),
            Box::new(UnauthorizedAccessDetector::new()),
        ];

        Self {
            detectors,
            store,
            sink: None,
        }
    }

    /// Attach an NDJSON sink; every alert is also written there
    pub fn with_sink(mut self, sink: AlertSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run every detector against the event (no short-circuit between
    /// detectors; one event can raise several alert types).
    ///
    /// Exactly one store write is attempted per detected condition. A store
    /// failure is surfaced to the caller after the remaining detectors have
    /// run; a detected alert is never silently dropped.
    pub fn process(&self, event: &NormalizedEvent, now: DateTime<Utc>) -> Result<Vec<Alert>> {
        let mut alerts = Vec::new();
        let mut store_failure: Option<anyhow::Error> = None;

        for detector in &self.detectors {
            let Some(alert) = detector.inspect(event, now) else {
                continue;
            };

            info!(
                target: TARGET_ENGINE,
                detector = detector.name(),
                severity = ?alert.severity,
                source_ip = alert.source_ip.as_deref().unwrap_or("-"),
                "Detection triggered"
            );

            if let Some(sink) = &self.sink {
                sink.write_alert(&alert);
            }

            if let Err(err) = self
                .store
                .record(alert.clone())
                .with_context(|| format!("failed to record {} alert", detector.name()))
            {
                error!(target: TARGET_ENGINE, error = %err, "Alert store write failed");
                if store_failure.is_none() {
                    store_failure = Some(err);
                }
            }

            alerts.push(alert);
        }

        match store_failure {
            Some(err) => Err(err),
            None => Ok(alerts),
        }
    }
}
