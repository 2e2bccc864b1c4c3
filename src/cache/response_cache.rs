//! Response Cache Module
//!
//! Two-tier TTL cache: process memory first, then persistent storage.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, MemoryStore, NoStorage, Storage, SystemClock};

// == Response Cache ==
/// Cache of decoded backend responses keyed by [`CacheKey`](crate::cache::CacheKey).
///
/// Reads never fail: a storage problem reads as a miss and a storage write
/// problem leaves the memory tier populated.
pub struct ResponseCache {
    memory: RwLock<MemoryStore>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    ttl_ms: u64,
}

impl ResponseCache {
    // == Constructor ==
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            memory: RwLock::new(MemoryStore::new()),
            storage,
            clock,
            ttl_ms: ttl.as_millis() as u64,
        }
    }

    /// Memory-only cache on the system clock.
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(NoStorage), Arc::new(SystemClock), ttl)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    // == Lookup ==
    /// Returns a fresh payload from memory, else from storage (promoting it
    /// into memory), else `None`.
    pub async fn lookup(&self, key: &str) -> Option<Value> {
        let now = self.clock.now_ms();

        if let Some(payload) = self.memory.write().await.get_fresh(key, now, self.ttl_ms) {
            debug!(key, "memory cache hit");
            return Some(payload);
        }

        let persisted = self.read_storage(key).await;
        let mut memory = self.memory.write().await;
        match persisted {
            Some(entry) if entry.is_fresh(now, self.ttl_ms) => {
                debug!(key, "storage cache hit");
                let payload = entry.payload.clone();
                memory.insert(key.to_string(), entry);
                memory.stats_mut().record_storage_hit();
                Some(payload)
            }
            _ => {
                debug!(key, "cache miss");
                memory.stats_mut().record_miss();
                None
            }
        }
    }

    // == Store ==
    /// Writes `payload` as a new entry stamped now into both tiers.
    pub async fn store(&self, key: &str, payload: Value) {
        let entry = CacheEntry::new(payload, self.clock.now_ms());

        match serde_json::to_string(&entry) {
            Ok(raw) => {
                if let Err(err) = self.storage.set(key, &raw).await {
                    debug!(key, error = %err, "persistent cache write skipped");
                }
            }
            Err(err) => debug!(key, error = %err, "cache entry not serializable"),
        }

        let mut memory = self.memory.write().await;
        memory.insert(key.to_string(), entry);
        memory.stats_mut().record_fetch();
    }

    // == Record Fallback ==
    pub async fn record_fallback(&self) {
        self.memory.write().await.stats_mut().record_fallback();
    }

    /// Timestamp of the entry currently held in memory, fresh or not.
    pub async fn timestamp_of(&self, key: &str) -> Option<u64> {
        self.memory.read().await.peek(key).map(|entry| entry.timestamp)
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.memory.read().await.stats()
    }

    async fn read_storage(&self, key: &str) -> Option<CacheEntry<Value>> {
        let raw = self.storage.get(key).await?;
        match parse_persisted(&raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(key, error = %err, "ignoring corrupt persisted cache entry");
                None
            }
        }
    }
}

/// Persisted entries are plain JSON, or base64-wrapped JSON as older
/// writers stored them.
fn parse_persisted(raw: &str) -> Result<CacheEntry<Value>, serde_json::Error> {
    serde_json::from_str(raw).or_else(|err| match STANDARD.decode(raw.trim()) {
        Ok(decoded) => serde_json::from_slice(&decoded),
        Err(_) => Err(err),
    })
}
