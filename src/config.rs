//! Configuration module
//!
//! Provides structured configuration for the logwarden engine.
//! Configuration can be loaded from:
//! 1. Default values (hardcoded)
//! 2. config.toml file (optional)
//! 3. Environment variables with SIEM__ prefix
//!
//! Example environment variable override:
//! SIEM__LOGGING__LEVEL=debug
//! SIEM__DETECTION__BRUTE_FORCE_THRESHOLD=10

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub detection: DetectionConfig,
    pub logging: LogConfig,
    pub alerts: AlertConfig,
    pub collector: CollectorConfig,
}

/// Detection engine thresholds and window spans
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Brute-force window span in seconds
    pub brute_force_window_secs: u64,
    /// Failed attempts within the window that trigger an alert
    pub brute_force_threshold: usize,
    /// Port-scan window span in seconds
    pub port_scan_window_secs: u64,
    /// Distinct ports within the window that trigger an alert
    pub port_scan_threshold: usize,
    /// Lock stripes per window store
    pub window_shards: usize,
}

/// Operational logging configuration (application debug logs)
#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub directory: PathBuf,
    pub filename: String,
    pub console_output: bool,
}

/// Security alerts configuration (NDJSON output plus in-memory history caps)
#[derive(Debug, Deserialize)]
pub struct AlertConfig {
    pub directory: PathBuf,
    pub filename: String,
    pub history_limit: usize,
    pub event_history_limit: usize,
}

/// Log collection configuration
#[derive(Debug, Deserialize)]
pub struct CollectorConfig {
    /// Directory scanned for *.log files
    pub watch_directory: PathBuf,
    /// Source tag stamped on collected events
    pub source: String,
    /// Worker tasks draining the ingest channel
    pub workers: usize,
    /// Bounded ingest channel capacity
    pub channel_capacity: usize,
    /// Seconds between directory re-scans in run mode
    pub poll_interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from defaults, config.toml, and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let s = config::Config::builder()
            // --- Defaults ---
            // Detection
            .set_default("detection.brute_force_window_secs", 300)?
            .set_default("detection.brute_force_threshold", 5)?
            .set_default("detection.port_scan_window_secs", 120)?
            .set_default("detection.port_scan_threshold", 10)?
            .set_default("detection.window_shards", 16)?
            // Logging
            .set_default("logging.level", "info")?
            .set_default("logging.directory", "logs")?
            .set_default("logging.filename", "logwarden.log")?
            .set_default("logging.console_output", true)?
            // Alerts
            .set_default("alerts.directory", "logs")?
            .set_default("alerts.filename", "alerts.json")?
            .set_default("alerts.history_limit", 1000)?
            .set_default("alerts.event_history_limit", 1000)?
            // Collector
            .set_default("collector.watch_directory", "ingest")?
            .set_default("collector.source", "system")?
            .set_default("collector.workers", 4)?
            .set_default("collector.channel_capacity", 1024)?
            .set_default("collector.poll_interval_secs", 5)?
            // --- Sources ---
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("SIEM").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            brute_force_window_secs: 300,
            brute_force_threshold: 5,
            port_scan_window_secs: 120,
            port_scan_threshold: 10,
            window_shards: 16,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            logging: LogConfig {
                level: "info".to_string(),
                directory: PathBuf::from("logs"),
                filename: "logwarden.log".to_string(),
                console_output: true,
            },
            alerts: AlertConfig {
                directory: PathBuf::from("logs"),
                filename: "alerts.json".to_string(),
                history_limit: 1000,
                event_history_limit: 1000,
            },
            collector: CollectorConfig {
                watch_directory: PathBuf::from("ingest"),
                source: "system".to_string(),
                workers: 4,
                channel_capacity: 1024,
                poll_interval_secs: 5,
            },
        }
    }
}
