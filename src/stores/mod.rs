//! Store Contracts Module
//!
//! Abstract contracts for the two external collaborators of the cache layer:
//! the shared key-value cache store and the authoritative item store. The
//! caching core only ever talks to these traits; the in-memory
//! implementations back the demo binary and the test suite.

mod memory;

pub use memory::{MemoryCacheStore, MemoryItemStore};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Item, ItemDraft};

// == Cache Store Contract ==
/// Key-value operations of the shared cache store.
///
/// Values are opaque strings (the cache layer stores JSON). Expired entries
/// are evicted autonomously by the store; a `get` after expiry behaves like
/// an absent key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Retrieves the value for a key, or None if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Retrieves values for several keys in one round-trip.
    ///
    /// The returned vector is aligned with the input: position i holds the
    /// value for `keys[i]`, or None on a miss.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Stores a value under a key with the given TTL, overwriting any
    /// previous entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Atomically stores a value only if the key is currently absent.
    ///
    /// Returns true if the value was stored. This is the primitive behind
    /// per-key locking, so the absence check and the write must be one
    /// atomic step.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Removes an entry. Returns true if an entry existed.
    async fn delete(&self, key: &str) -> Result<bool>;
}

// == Item Store Contract ==
/// Authoritative reads and writes against the backing item store.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetches a single item by id, or None if no record exists.
    async fn fetch(&self, id: u64) -> Result<Option<Item>>;

    /// Fetches several items in one batched call.
    ///
    /// Ids without a record are simply absent from the result.
    async fn fetch_many(&self, ids: &[u64]) -> Result<Vec<Item>>;

    /// Enumerates all valid item ids, one page at a time.
    ///
    /// Pages are zero-based; an empty page signals the end of the scan.
    /// Used once per process lifetime to build the membership filter.
    async fn scan_ids(&self, page: usize, page_size: usize) -> Result<Vec<u64>>;

    /// Inserts a new item, assigning its id. Returns the stored record.
    async fn insert(&self, draft: ItemDraft) -> Result<Item>;

    /// Replaces an existing item's attributes.
    ///
    /// Returns the committed record (the store owns timestamps), or None if
    /// no record with the item's id exists.
    async fn update(&self, item: &Item) -> Result<Option<Item>>;

    /// Deletes an item by id. Returns false if no record existed.
    async fn remove(&self, id: u64) -> Result<bool>;
}
