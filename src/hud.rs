//! Request timing log.
//!
//! The caller owns a `RequestLog` and passes it to whatever performs
//! requests. Capacity is fixed; the oldest record is evicted first.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestRecord {
    pub url: String,
    pub method: String,
    /// 0 when no response was received.
    pub status: u16,
    pub timings: BTreeMap<String, f64>,
    pub region: String,
    pub cache: String,
    pub total_ms: u64,
    pub server_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RequestRecord {
    pub fn new(url: &str, method: &str) -> Self {
        RequestRecord {
            url: url.to_string(),
            method: method.to_string(),
            status: 0,
            timings: BTreeMap::new(),
            region: "unknown".into(),
            cache: "unknown".into(),
            total_ms: 0,
            server_ms: 0.0,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a parsed `Server-Timing` header; `server_ms` is the sum of durations.
    pub fn with_server_timing(mut self, header: &str) -> Self {
        self.timings = parse_server_timing(header);
        self.server_ms = self.timings.values().sum();
        self
    }
}

#[derive(Debug, Clone)]
pub struct RequestLog {
    capacity: usize,
    records: VecDeque<RequestRecord>,
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RequestLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        RequestLog {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, record: RequestRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &RequestRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sum of client-side durations over retained records.
    pub fn total_ms(&self) -> u64 {
        self.records.iter().map(|r| r.total_ms).sum()
    }

    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.error.is_some()).count()
    }
}

/// Parse `db;dur=53.2, app;dur=47.1;desc="render"` into name → duration.
/// Entries without a `dur` are skipped.
pub fn parse_server_timing(header: &str) -> BTreeMap<String, f64> {
    header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';').map(str::trim);
            let name = parts.next().filter(|n| !n.is_empty())?;
            let dur = parts
                .filter_map(|p| p.strip_prefix("dur="))
                .find_map(|d| d.trim_matches('"').parse::<f64>().ok())?;
            Some((name.to_string(), dur))
        })
        .collect()
}
