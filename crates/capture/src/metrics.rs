//! Capture metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared capture counters
///
/// Written from delivery callbacks and the synchronizer loop, read by the
/// session stats reporter.
#[derive(Debug, Default)]
pub struct CaptureMetrics {
    /// Total observations received from all sensors
    pub observations_received: AtomicU64,

    /// Observations dropped because a queue was full
    pub observations_dropped: AtomicU64,

    /// Stale observations discarded during synchronization
    pub observations_discarded: AtomicU64,
}

impl CaptureMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record observation received
    pub fn record_received(&self) {
        self.observations_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record observation dropped (queue full)
    pub fn record_dropped(&self) {
        self.observations_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record stale observation discarded
    pub fn record_discarded(&self) {
        self.observations_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            observations_received: self.observations_received.load(Ordering::Relaxed),
            observations_dropped: self.observations_dropped.load(Ordering::Relaxed),
            observations_discarded: self.observations_discarded.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub observations_received: u64,
    pub observations_dropped: u64,
    pub observations_discarded: u64,
}
