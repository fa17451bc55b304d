//! Lightweight in-process drain counters, readable by the host.
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct DrainCounters {
    drains: AtomicU64,
    requests_sent: AtomicU64,
    bytes_sent: AtomicU64,
    expired_dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub drains: u64,
    pub requests_sent: u64,
    pub bytes_sent: u64,
    pub expired_dropped: u64,
}

impl DrainCounters {
    pub fn record_drain(&self, requests_sent: u64, bytes_sent: u64) {
        self.drains.fetch_add(1, Ordering::Relaxed);
        self.requests_sent.fetch_add(requests_sent, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes_sent, Ordering::Relaxed);
    }

    pub fn record_expired(&self, dropped: u64) {
        self.expired_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            drains: self.drains.load(Ordering::Relaxed),
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            expired_dropped: self.expired_dropped.load(Ordering::Relaxed),
        }
    }
}
