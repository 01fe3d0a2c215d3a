//! Lock-free counters for the cache-aside read and write paths.

use std::sync::atomic::{AtomicU64, Ordering};

use tasktrack_core::cache::CacheStats;

/// Running counters shared between the engine and the health endpoint.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    store_queries: AtomicU64,
    coalesced: AtomicU64,
    populate_failures: AtomicU64,
    invalidate_failures: AtomicU64,
    decode_failures: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_store_query(&self) {
        self.store_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_populate_failure(&self) {
        self.populate_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidate_failure(&self) {
        self.invalidate_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values.
    ///
    /// Counters are read one at a time, so a snapshot taken under load may
    /// mix values from slightly different instants.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            store_queries: self.store_queries.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            populate_failures: self.populate_failures.load(Ordering::Relaxed),
            invalidate_failures: self.invalidate_failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}
