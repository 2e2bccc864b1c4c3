//! Cache Module
//!
//! Two-tier response caching with TTL freshness, an injected clock and an
//! injected persistent storage backend.

mod clock;
mod entry;
mod key;
mod response_cache;
mod stats;
mod storage;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::CacheKey;
pub use response_cache::ResponseCache;
pub use stats::CacheStats;
pub use storage::{FileStorage, MemoryStorage, NoStorage, Storage};
pub use store::MemoryStore;

// == Public Constants ==
/// Default freshness window for cached responses (1 hour)
pub const DEFAULT_TTL_SECS: u64 = 60 * 60;
