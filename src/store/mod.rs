//! Alert and event history store.
//!
//! The pipeline and scorer only depend on the narrow `AlertStore` contract;
//! the bundled implementation keeps bounded in-memory ring buffers.

use crate::models::{Alert, NormalizedEvent};
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::RwLock;

/// Append-only alert sink plus the newest-first read used by the scorer.
pub trait AlertStore: Send + Sync {
    fn record(&self, alert: Alert) -> Result<()>;
    /// Most recent alerts, newest first. `limit` is clamped to the store cap.
    fn recent_alerts(&self, limit: usize) -> Vec<Alert>;
}

const DEFAULT_ALERT_LIMIT: usize = 1000;
const DEFAULT_EVENT_LIMIT: usize = 1000;

/// In-memory store retaining recent alerts and recent event history
pub struct MemoryStore {
    alerts: RwLock<VecDeque<Alert>>,
    events: RwLock<VecDeque<NormalizedEvent>>,
    max_alerts: usize,
    max_events: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_ALERT_LIMIT, DEFAULT_EVENT_LIMIT)
    }

    pub fn with_limits(max_alerts: usize, max_events: usize) -> Self {
        Self {
            alerts: RwLock::new(VecDeque::new()),
            events: RwLock::new(VecDeque::new()),
            max_alerts: max_alerts.max(1),
            max_events: max_events.max(1),
        }
    }

    /// Append an event to the history ring buffer
    pub fn record_event(&self, event: NormalizedEvent) {
        let mut events = self.events.write().unwrap();
        events.push_back(event);
        while events.len() > self.max_events {
            events.pop_front();
        }
    }

    /// Most recent events, newest first
    pub fn recent_events(&self, limit: usize) -> Vec<NormalizedEvent> {
        let events = self.events.read().unwrap();
        events
            .iter()
            .rev()
            .take(limit.min(self.max_events))
            .cloned()
            .collect()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.read().unwrap().len()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().unwrap().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertStore for MemoryStore {
    fn record(&self, alert: Alert) -> Result<()> {
        let mut alerts = self.alerts.write().unwrap();
        alerts.push_back(alert);
        while alerts.len() > self.max_alerts {
            alerts.pop_front();
        }
        Ok(())
    }

    fn recent_alerts(&self, limit: usize) -> Vec<Alert> {
        let alerts = self.alerts.read().unwrap();
        alerts
            .iter()
            .rev()
            .take(limit.min(self.max_alerts))
            .cloned()
            .collect()
    }
}
