//! Engine counters.
//!
//! Relaxed atomics: the numbers are for dashboards and tests, not for
//! synchronisation.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hit/miss counters for one cache.
#[derive(Debug, Default)]
pub struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a cache's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache (0.0 when unused).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Counters for an argument buffer pool.
#[derive(Debug, Default)]
pub struct PoolCounters {
    allocated: AtomicU64,
    reused: AtomicU64,
    dropped: AtomicU64,
}

impl PoolCounters {
    pub(crate) fn allocated(&self) {
        self.allocated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn reused(&self) {
        self.reused.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, idle: usize) -> PoolStats {
        PoolStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            idle,
        }
    }
}

/// Point-in-time view of a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Buffers created because none were idle.
    pub allocated: u64,
    /// Acquisitions served from an idle buffer.
    pub reused: u64,
    /// Buffers discarded on release because the pool was full.
    pub dropped: u64,
    /// Buffers currently idle in the pool.
    pub idle: usize,
}

/// Snapshot of both shared caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub field_cache: CacheStats,
    pub conversion_cache: CacheStats,
    /// Record types with cached field descriptors.
    pub cached_records: usize,
    /// Memoized (source kind, target shape) pairs.
    pub cached_conversions: usize,
}
