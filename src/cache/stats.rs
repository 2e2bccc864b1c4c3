//! Cache Statistics Module
//!
//! Tracks how lookups were answered: memory tier, storage tier, or network.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the in-memory tier
    pub memory_hits: u64,
    /// Lookups answered from persistent storage (and promoted to memory)
    pub storage_hits: u64,
    /// Lookups that found no fresh entry in either tier
    pub misses: u64,
    /// Successful backend fetches written into the cache
    pub network_fetches: u64,
    /// Generated fallback lists served instead of a failed fetch
    pub fallbacks: u64,
    /// Current number of entries in the memory tier
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses) counting both tiers, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.storage_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn record_memory_hit(&mut self) {
        self.memory_hits += 1;
    }

    pub fn record_storage_hit(&mut self) {
        self.storage_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_fetch(&mut self) {
        self.network_fetches += 1;
    }

    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
