//! Metrics hooks for deduplication passes
//!
//! Counts how many records a pass examined, emitted and dropped. Counters
//! are atomic so one recorder can be shared by every worker of a parallel
//! pass.
//!
//! ## Usage
//!
//! ```
//! use bloom_dedup::{BloomFilter, DedupExt, DedupMetrics};
//!
//! let metrics = DedupMetrics::new();
//! let mut filter = BloomFilter::with_capacity(100, 0.01).unwrap();
//! let kept: Vec<_> = ["a", "b", "a"]
//!     .into_iter()
//!     .dedupe_with(&mut filter)
//!     .with_metrics(&metrics)
//!     .collect();
//!
//! assert_eq!(kept, vec!["a", "b"]);
//! assert_eq!(metrics.snapshot().duplicates_dropped, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for deduplication passes
#[derive(Debug, Default)]
pub struct DedupMetrics {
    /// Records pulled from the input
    pub records_seen: AtomicU64,
    /// Records forwarded downstream
    pub records_emitted: AtomicU64,
    /// Records suppressed as probable duplicates
    pub duplicates_dropped: AtomicU64,
}

impl DedupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one examined record and whether it survived
    pub fn record_outcome(&self, emitted: bool) {
        self.records_seen.fetch_add(1, Ordering::Relaxed);
        if emitted {
            self.records_emitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.duplicates_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_seen: self.records_seen.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
            duplicates_dropped: self.duplicates_dropped.load(Ordering::Relaxed),
        }
    }

    /// Fraction of examined records that were dropped
    pub fn duplicate_ratio(&self) -> f64 {
        self.snapshot().duplicate_ratio()
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.records_seen.store(0, Ordering::Relaxed);
        self.records_emitted.store(0, Ordering::Relaxed);
        self.duplicates_dropped.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_seen: u64,
    pub records_emitted: u64,
    pub duplicates_dropped: u64,
}

impl MetricsSnapshot {
    pub fn duplicate_ratio(&self) -> f64 {
        if self.records_seen > 0 {
            self.duplicates_dropped as f64 / self.records_seen as f64
        } else {
            0.0
        }
    }
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to forward pass outcomes to an external metrics
/// system.
pub trait MetricsRecorder: Send + Sync {
    /// Called once per examined record
    fn record_outcome(&self, emitted: bool);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    #[inline]
    fn record_outcome(&self, _: bool) {}
}

impl MetricsRecorder for DedupMetrics {
    fn record_outcome(&self, emitted: bool) {
        DedupMetrics::record_outcome(self, emitted);
    }
}

impl<R: MetricsRecorder + ?Sized> MetricsRecorder for &R {
    fn record_outcome(&self, emitted: bool) {
        (**self).record_outcome(emitted);
    }
}
