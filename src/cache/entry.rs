//! Cache Entry Module
//!
//! Defines the shape of values the caching layer writes to the shared cache
//! store, the key scheme, and the jittered TTL for negative entries.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};
use crate::models::Item;

// == Cached Value ==
/// The payload stored under an item's cache key.
///
/// Either a full item projection or a negative marker recording that the id
/// is known to be invalid. Negative markers let repeat lookups for bad ids
/// resolve from cache instead of penetrating to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "item", rename_all = "snake_case")]
pub enum CachedValue {
    /// A cached copy of the store record
    Present(Item),
    /// The id has no record; cached to absorb repeat lookups
    Missing,
}

impl CachedValue {
    /// Serializes the value to the JSON string stored in the cache.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ServiceError::Internal(format!("Failed to encode cache value: {}", e)))
    }

    /// Deserializes a cache string back into a value.
    pub fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| ServiceError::Internal(format!("Failed to decode cache value: {}", e)))
    }

    /// Returns true for the negative marker.
    pub fn is_negative(&self) -> bool {
        matches!(self, CachedValue::Missing)
    }
}

// == Key Scheme ==
/// Cache key for an item entry.
pub fn item_key(id: u64) -> String {
    format!("item::{}", id)
}

/// Cache key for an item's per-key lock record.
pub fn lock_key(id: u64) -> String {
    format!("lock:item::{}", id)
}

// == Negative TTL Jitter ==
/// Picks a TTL uniformly within `[min_secs, max_secs)`.
///
/// Negative entries are written in bursts when a bad key is hammered;
/// jittering their TTLs keeps them from expiring in synchrony and re-opening
/// the penetration window all at once. Falls back to `min_secs` if the
/// window is empty.
pub fn jittered_negative_ttl(min_secs: u64, max_secs: u64) -> Duration {
    if min_secs >= max_secs {
        return Duration::from_secs(min_secs);
    }
    let secs = rand::thread_rng().gen_range(min_secs..max_secs);
    Duration::from_secs(secs)
}
