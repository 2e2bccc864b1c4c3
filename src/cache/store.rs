//! Memory Store Module
//!
//! The in-process cache tier: a map of timestamped JSON payloads.

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats};

// == Memory Store ==
/// In-memory tier of the response cache.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Cached payloads by cache key
    entries: HashMap<String, CacheEntry<Value>>,
    /// Lookup statistics for both tiers
    stats: CacheStats,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Get Fresh ==
    /// Returns the payload under `key` if it is still fresh at `now`.
    ///
    /// Stale entries are dropped. Only hits are counted here; a memory miss
    /// may still be answered by persistent storage.
    pub fn get_fresh(&mut self, key: &str, now: u64, ttl_ms: u64) -> Option<Value> {
        let fresh = self.entries.get(key)?.is_fresh(now, ttl_ms);
        if !fresh {
            self.entries.remove(key);
            self.stats.set_total_entries(self.entries.len());
            return None;
        }

        self.stats.record_memory_hit();
        self.entries.get(key).map(|entry| entry.payload.clone())
    }

    // == Insert ==
    /// Installs `entry` under `key` unless a newer entry is already resident.
    ///
    /// Returns true if the entry was installed.
    pub fn insert(&mut self, key: String, entry: CacheEntry<Value>) -> bool {
        if let Some(existing) = self.entries.get(&key) {
            if !entry.supersedes(existing) {
                return false;
            }
        }

        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
        true
    }

    // == Peek ==
    /// Returns the resident entry regardless of freshness, without touching stats.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<Value>> {
        self.entries.get(key)
    }

    pub fn stats_mut(&mut self) -> &mut CacheStats {
        &mut self.stats
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in memory.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
