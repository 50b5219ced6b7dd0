//! Per-source sliding window state.
//!
//! Keyed, time-bounded observation sequences backing the stateful detectors.
//! Keys are striped across a fixed set of mutexes so different sources never
//! contend; operations on one key are serialized by its shard lock.

use chrono::{DateTime, Duration, Utc};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

const DEFAULT_SHARDS: usize = 16;

/// Retained observations for one key, oldest first
pub type Entries<T> = VecDeque<(DateTime<Utc>, T)>;

type Shard<T> = Mutex<HashMap<String, Entries<T>>>;

/// Per-key expiring sequence of observations.
///
/// Entries are appended with an explicit `now`, kept in insertion order, and
/// trimmed so that every retained entry is younger than `span`. Windows are
/// created lazily on first observation and dropped once empty.
pub struct WindowStore<T> {
    shards: Vec<Shard<T>>,
    span: Duration,
}

impl<T> WindowStore<T> {
    /// Create a store with the given retention span and default shard count
    pub fn new(span: Duration) -> Self {
        Self::with_shards(span, DEFAULT_SHARDS)
    }

    /// Create a store with a custom shard count (useful for tests)
    pub fn with_shards(span: Duration, shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| Mutex::new(HashMap::new())).collect(),
            span,
        }
    }

    fn shard(&self, key: &str) -> &Shard<T> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    fn trim(&self, entries: &mut Entries<T>, now: DateTime<Utc>) {
        while let Some((stamp, _)) = entries.front() {
            if now.signed_duration_since(*stamp) >= self.span {
                entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// Append an observation tagged with `now`, trim expired entries for the
    /// key, and return the retained count.
    pub fn record(&self, key: &str, value: T, now: DateTime<Utc>) -> usize {
        let mut shard = self.shard(key).lock().unwrap();
        let entries = shard.entry(key.to_string()).or_default();
        entries.push_back((now, value));
        self.trim(entries, now);
        entries.len()
    }

    /// Number of retained entries for `key`, after trimming against `now`
    pub fn count(&self, key: &str, now: DateTime<Utc>) -> usize {
        let mut shard = self.shard(key).lock().unwrap();
        let Some(entries) = shard.get_mut(key) else {
            return 0;
        };
        self.trim(entries, now);
        let len = entries.len();
        if len == 0 {
            shard.remove(key);
        }
        len
    }

    /// Number of distinct projected values among retained entries
    pub fn distinct_count<P, K>(&self, key: &str, now: DateTime<Utc>, project: P) -> usize
    where
        P: Fn(&T) -> K,
        K: Eq + Hash,
    {
        let mut shard = self.shard(key).lock().unwrap();
        let Some(entries) = shard.get_mut(key) else {
            return 0;
        };
        self.trim(entries, now);
        entries
            .iter()
            .map(|(_, value)| project(value))
            .collect::<std::collections::HashSet<_>>()
            .len()
    }

    /// Clear all entries for `key`
    pub fn reset(&self, key: &str) {
        let mut shard = self.shard(key).lock().unwrap();
        shard.remove(key);
    }

    /// Append + trim + threshold check + conditional reset under one lock.
    ///
    /// `decide` sees the retained entries after the new observation is
    /// appended. When it returns `Some`, the key's window is cleared before
    /// the lock is released, so two writers racing past a trigger threshold
    /// cannot both fire for the same burst.
    pub fn record_and_trigger<R>(
        &self,
        key: &str,
        value: T,
        now: DateTime<Utc>,
        decide: impl FnOnce(&Entries<T>) -> Option<R>,
    ) -> Option<R> {
        let mut shard = self.shard(key).lock().unwrap();
        let entries = shard.entry(key.to_string()).or_default();
        entries.push_back((now, value));
        self.trim(entries, now);
        let verdict = decide(entries);
        if verdict.is_some() {
            shard.remove(key);
        }
        verdict
    }
}
