use serde::{Deserialize, Serialize};

/// Point-in-time counters for the cache-aside layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads answered from the cache.
    pub hits: u64,
    /// Reads that found no usable cache entry.
    pub misses: u64,
    /// Queries issued to the backing store by the read path.
    pub store_queries: u64,
    /// Misses answered by the re-check after another reader populated the key.
    pub coalesced: u64,
    /// Cache writes after a store read that failed.
    pub populate_failures: u64,
    /// Cache deletes after a store write that failed.
    pub invalidate_failures: u64,
    /// Cached values that could not be decoded.
    pub decode_failures: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
