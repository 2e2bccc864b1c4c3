//! Cache Entry Module
//!
//! Defines the timestamped payload stored in both cache tiers.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached payload together with the moment it was fetched.
///
/// Serialized as `{"ts": <unix ms>, "data": <payload>}`, which is also the
/// exact format written to persistent storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Fetch timestamp (Unix milliseconds)
    #[serde(rename = "ts")]
    pub timestamp: u64,
    /// The cached value
    #[serde(rename = "data")]
    pub payload: T,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry stamped with `timestamp`.
    pub fn new(payload: T, timestamp: u64) -> Self {
        Self { timestamp, payload }
    }

    // == Age ==
    /// Returns the entry age at `now` in milliseconds.
    ///
    /// Entries stamped in the future (clock skew between processes sharing a
    /// storage directory) have age zero.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    // == Is Fresh ==
    /// An entry is fresh iff `now - timestamp < ttl`.
    ///
    /// At exactly `timestamp + ttl` the entry is already stale.
    pub fn is_fresh(&self, now: u64, ttl_ms: u64) -> bool {
        self.age_ms(now) < ttl_ms
    }

    // == Supersedes ==
    /// Last-writer-wins: `self` may replace `other` unless it is older.
    pub fn supersedes(&self, other: &CacheEntry<T>) -> bool {
        self.timestamp >= other.timestamp
    }
}
