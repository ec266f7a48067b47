//! Cache Layer Module
//!
//! The read-through/write-invalidate caching layer that shields the backing
//! store from cache penetration and cache stampede: a bloom-filter membership
//! gate for impossible ids, per-key distributed locking on misses, negative
//! caching for invalid ids, and batched cache/store reconciliation.

mod entry;
mod filter;
mod items;
mod lock;
mod stats;


// Re-export public types
pub use entry::{item_key, jittered_negative_ttl, lock_key, CachedValue};
pub use filter::MembershipFilter;
pub use items::ItemCache;
pub use lock::KeyLock;
pub use stats::{CacheStats, StatsSnapshot};
