//! Process-wide server counters.

use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde::Serialize;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    requests: u64,
    searches: u64,
    connections: u64,
    active_connections: u64,
    errors: u64,
}

/// Thread-safe registry of server counters.
///
/// Every counter lives behind a single lock, so a [`StatsSnapshot`] never sees
/// half of a multi-field update (e.g. a connection counted as opened but not
/// yet as active).
#[derive(Debug)]
pub struct StatsRegistry {
    started: Instant,
    started_utc: DateTime<Utc>,
    counters: RwLock<Counters>,
}

impl Default for StatsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsRegistry {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            started_utc: Utc::now(),
            counters: RwLock::new(Counters::default()),
        }
    }

    pub fn increment_requests(&self) {
        self.counters.write().requests += 1;
    }

    pub fn increment_searches(&self) {
        self.counters.write().searches += 1;
    }

    pub fn increment_errors(&self) {
        self.counters.write().errors += 1;
    }

    /// Count a new connection and raise the active gauge.
    pub fn connection_opened(&self) {
        let mut counters = self.counters.write();
        counters.connections += 1;
        counters.active_connections += 1;
    }

    /// Lower the active gauge. Pairs with [`connection_opened`](Self::connection_opened).
    pub fn connection_closed(&self) {
        let mut counters = self.counters.write();
        counters.active_connections = counters.active_connections.saturating_sub(1);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let counters = *self.counters.read();
        let uptime = self.started.elapsed();

        StatsSnapshot {
            start_time: self.started_utc.to_rfc3339_opts(SecondsFormat::Secs, true),
            uptime_seconds: uptime.as_secs_f64(),
            uptime_human: humanize(uptime),
            request_count: counters.requests,
            search_count: counters.searches,
            connection_count: counters.connections,
            active_connections: counters.active_connections,
            errors: counters.errors,
            memory: MemoryStats::sample(),
            runtime: RuntimeStats::sample(),
        }
    }
}

/// Point-in-time view of the registry plus process metrics sampled at read time.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub start_time: String,
    pub uptime_seconds: f64,
    pub uptime_human: String,
    pub request_count: u64,
    pub search_count: u64,
    pub connection_count: u64,
    pub active_connections: u64,
    pub errors: u64,
    pub memory: MemoryStats,
    pub runtime: RuntimeStats,
}

/// Process memory, where the platform exposes it (Linux `/proc`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryStats {
    pub resident_mb: Option<f64>,
    pub virtual_mb: Option<f64>,
}

impl MemoryStats {
    fn sample() -> Self {
        match std::fs::read_to_string("/proc/self/status") {
            Ok(status) => Self {
                resident_mb: status_kib(&status, "VmRSS:").map(kib_to_mb),
                virtual_mb: status_kib(&status, "VmSize:").map(kib_to_mb),
            },
            Err(_) => Self::default(),
        }
    }
}

/// Async runtime load: worker threads and live tasks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuntimeStats {
    pub workers: Option<usize>,
    pub alive_tasks: Option<usize>,
}

impl RuntimeStats {
    fn sample() -> Self {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let metrics = handle.metrics();
                Self {
                    workers: Some(metrics.num_workers()),
                    alive_tasks: Some(metrics.num_alive_tasks()),
                }
            }
            Err(_) => Self::default(),
        }
    }
}

fn status_kib(status: &str, key: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
}

fn kib_to_mb(kib: u64) -> f64 {
    kib as f64 / 1024.0
}

fn humanize(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{:.3}s", uptime.as_secs_f64())
    }
}
