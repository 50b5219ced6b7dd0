//! Logwarden: behavioral threat detection for security logs.
//!
//! Ingests raw log lines, normalizes them, and runs a fixed detector set
//! over each event: brute force, port scans, SQL injection, suspicious
//! commands, and unauthorized access.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use logwarden::alerts::AlertSink;
use logwarden::collector::Collector;
use logwarden::config::AppConfig;
use logwarden::detect::DetectionPipeline;
use logwarden::models::NormalizedEvent;
use logwarden::scorer::ThreatScorer;
use logwarden::store::MemoryStore;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "logwarden")]
#[command(about = "Behavioral threat detection for security logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Override logging level (e.g., error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a log directory and analyze events as they arrive
    Run {
        /// Directory to watch for *.log files (overrides config)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Push a synthetic sample corpus through the pipeline and report
    Generate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = AppConfig::new()
        .map_err(|err| anyhow::anyhow!("Failed to load configuration: {err}"))
        .context("check config.toml and SIEM__* environment overrides")?;
    if let Some(level) = cli.log_level {
        if !level.trim().is_empty() {
            cfg.logging.level = level;
        }
    }

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    match cli.command {
        Some(Commands::Generate) => runtime.block_on(run_engine(cfg, Mode::Generate)),
        Some(Commands::Run { dir }) => runtime.block_on(run_engine(cfg, Mode::Watch { dir })),
        None => runtime.block_on(run_engine(cfg, Mode::Watch { dir: None })),
    }
}

enum Mode {
    Watch { dir: Option<PathBuf> },
    Generate,
}

/// Initialize dual-pipeline logging system
/// Returns WorkerGuards that MUST be kept alive for the duration of the program
fn init_logging(
    cfg: &AppConfig,
) -> Result<(
    tracing_appender::non_blocking::WorkerGuard,
    tracing_appender::non_blocking::WorkerGuard,
    AlertSink,
)> {
    std::fs::create_dir_all(&cfg.logging.directory)
        .with_context(|| format!("Failed to create log directory {:?}", cfg.logging.directory))?;
    std::fs::create_dir_all(&cfg.alerts.directory).with_context(|| {
        format!(
            "Failed to create alerts directory {:?}",
            cfg.alerts.directory
        )
    })?;

    // 1. Operational logs (human readable text)
    let app_file = rolling::daily(&cfg.logging.directory, &cfg.logging.filename);
    let (app_writer, app_guard) = tracing_appender::non_blocking(app_file);

    let app_layer = fmt::layer()
        .with_writer(app_writer)
        .compact()
        .with_ansi(false)
        .with_target(true)
        .with_filter(EnvFilter::new(&cfg.logging.level));

    // 2. Security alerts (NDJSON)
    let alert_file = rolling::daily(&cfg.alerts.directory, &cfg.alerts.filename);
    let (alert_writer, alert_guard) = tracing_appender::non_blocking(alert_file);
    let alert_sink = AlertSink::new(alert_writer);

    // 3. Console (optional, for dev)
    let console_layer = if cfg.logging.console_output {
        Some(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_filter(EnvFilter::new(&cfg.logging.level)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(app_layer)
        .with(console_layer)
        .init();

    Ok((app_guard, alert_guard, alert_sink))
}

fn spawn_workers(
    count: usize,
    rx: mpsc::Receiver<NormalizedEvent>,
    store: Arc<MemoryStore>,
    pipeline: Arc<DetectionPipeline>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let rx = Arc::new(Mutex::new(rx));

    (0..count.max(1))
        .map(|worker| {
            let rx = Arc::clone(&rx);
            let store = Arc::clone(&store);
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                debug!(target: "engine", worker, "Pipeline worker started");
                loop {
                    let event = { rx.lock().await.recv().await };
                    let Some(event) = event else { break };

                    store.record_event(event.clone());
                    if let Err(err) = pipeline.process(&event, Utc::now()) {
                        // A failed store write loses a security-relevant
                        // alert; keep the worker alive but make it loud.
                        error!(target: "engine", worker, error = %err, "Event processing failed");
                    }
                }
                debug!(target: "engine", worker, "Pipeline worker shutting down");
            })
        })
        .collect()
}

async fn run_engine(cfg: AppConfig, mode: Mode) -> Result<()> {
    let (app_guard, alert_guard, alert_sink) = init_logging(&cfg)?;
    let _guards = (app_guard, alert_guard);

    info!(target: "logwarden", "Logwarden threat detection engine starting");
    info!(
        target: "logwarden",
        logs_dir = ?cfg.logging.directory,
        alerts_dir = ?cfg.alerts.directory,
        "Dual-pipeline logging initialized"
    );

    let store = Arc::new(MemoryStore::with_limits(
        cfg.alerts.history_limit,
        cfg.alerts.event_history_limit,
    ));
    let pipeline = Arc::new(
        DetectionPipeline::new(&cfg.detection, store.clone()).with_sink(alert_sink),
    );
    let scorer = ThreatScorer::new(store.clone());

    let (tx, rx) = mpsc::channel::<NormalizedEvent>(cfg.collector.channel_capacity);
    let workers = spawn_workers(cfg.collector.workers, rx, store.clone(), pipeline);
    let collector = Collector::new(tx);

    info!(target: "logwarden", workers = cfg.collector.workers, "Detection pipeline ready");

    match mode {
        Mode::Generate => {
            let submitted = collector.generate_sample_logs().await?;
            info!(target: "logwarden", submitted, "Sample logs submitted");

            // Close the channel so the workers drain and exit.
            drop(collector);
            for handle in workers {
                let _ = handle.await;
            }

            let score = scorer.current_score();
            let level = scorer.current_level();
            println!(
                "Processed {} events, raised {} alerts, threat score {} ({})",
                store.event_count(),
                store.alert_count(),
                score,
                level.as_str()
            );
        }
        Mode::Watch { dir } => {
            let watch_dir = dir.unwrap_or_else(|| cfg.collector.watch_directory.clone());
            std::fs::create_dir_all(&watch_dir)
                .with_context(|| format!("Failed to create watch directory {:?}", watch_dir))?;

            info!(target: "logwarden", dir = ?watch_dir, "Watching for *.log files");
            info!(target: "logwarden", "Press Ctrl+C to stop gracefully");

            // Initial pass picks up existing content; the poll loop tails
            // whatever gets appended afterwards.
            let mut offsets = HashMap::new();
            match collector
                .collect_new_from_dir(&watch_dir, &cfg.collector.source, &mut offsets)
                .await
            {
                Ok(submitted) => {
                    info!(target: "logwarden", submitted, "Initial collection pass complete")
                }
                Err(err) => warn!(target: "logwarden", error = %err, "Initial collection failed"),
            }

            let mut ticker =
                tokio::time::interval(Duration::from_secs(cfg.collector.poll_interval_secs.max(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!(target: "logwarden", "Received Ctrl+C signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        match collector
                            .collect_new_from_dir(&watch_dir, &cfg.collector.source, &mut offsets)
                            .await
                        {
                            Ok(0) => {}
                            Ok(submitted) => {
                                info!(
                                    target: "logwarden",
                                    submitted,
                                    threat_level = scorer.current_level().as_str(),
                                    "Collected new log lines"
                                );
                            }
                            Err(err) => {
                                warn!(target: "logwarden", error = %err, "Collection pass failed");
                            }
                        }
                    }
                }
            }

            drop(collector);
            for handle in workers {
                let _ = handle.await;
            }

            info!(
                target: "logwarden",
                events = store.event_count(),
                alerts = store.alert_count(),
                threat_level = scorer.current_level().as_str(),
                "Shutdown complete"
            );
        }
    }

    Ok(())
}
