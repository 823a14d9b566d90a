//! Periodic Writer metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Writer metrics, shared between the writer thread and its handle
#[derive(Debug, Default)]
pub struct WriterMetrics {
    /// Sensor fetches performed
    pub fetches: AtomicU64,

    /// Fetches that returned no line
    pub empty_fetches: AtomicU64,

    /// Bytes returned by the sensor
    pub bytes_fetched: AtomicU64,

    /// Lines stored in the buffer
    pub lines_appended: AtomicU64,

    /// Failed append calls
    pub append_failures: AtomicU64,
}

impl WriterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sensor fetch
    pub fn record_fetch(&self, bytes: usize, lines: usize) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.bytes_fetched.fetch_add(bytes as u64, Ordering::Relaxed);
        if lines == 0 {
            self.empty_fetches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_appended(&self, lines: usize) {
        self.lines_appended.fetch_add(lines as u64, Ordering::Relaxed);
    }

    pub fn record_append_failure(&self) {
        self.append_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> WriterStats {
        WriterStats {
            fetches: self.fetches.load(Ordering::Relaxed),
            empty_fetches: self.empty_fetches.load(Ordering::Relaxed),
            bytes_fetched: self.bytes_fetched.load(Ordering::Relaxed),
            lines_appended: self.lines_appended.load(Ordering::Relaxed),
            append_failures: self.append_failures.load(Ordering::Relaxed),
        }
    }
}

/// Writer metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub fetches: u64,
    pub empty_fetches: u64,
    pub bytes_fetched: u64,
    pub lines_appended: u64,
    pub append_failures: u64,
}
