//! In-Memory Store Implementations
//!
//! Process-local implementations of the cache and item store contracts.
//! They back the demo binary and the test suite; a deployment would swap in
//! a shared cache (Redis) and a relational store behind the same traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{Result, ServiceError};
use crate::models::{Item, ItemDraft};
use crate::stores::{CacheStore, ItemStore};

// == Stored Entry ==
/// A cache value together with its expiry deadline.
#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    expires_at: Instant,
}

impl StoredEntry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

// == Memory Cache Store ==
/// In-memory TTL cache implementing the `CacheStore` contract.
///
/// Expired entries are dropped lazily on read; the periodic cleanup task
/// sweeps the rest so the map stays bounded.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryCacheStore {
    /// Creates an empty cache store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Returns the current number of live entries.
    pub fn len(&self) -> usize {
        let entries = self.lock_entries();
        entries.values().filter(|e| !e.is_expired()).count()
    }

    /// Returns true if no live entries exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredEntry>> {
        self.entries.lock().expect("cache store mutex poisoned")
    }

    fn get_live(entries: &HashMap<String, StoredEntry>, key: &str) -> Option<String> {
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.lock_entries();
        // Drop the entry eagerly once it has expired
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
        }
        Ok(Self::get_live(&entries, key))
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let entries = self.lock_entries();
        Ok(keys
            .iter()
            .map(|key| Self::get_live(&entries, key))
            .collect())
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.lock_entries();
        entries.insert(key.to_string(), StoredEntry::new(value, ttl));
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        // Single lock scope keeps the check-and-insert atomic
        let mut entries = self.lock_entries();
        if entries.get(key).is_some_and(|e| !e.is_expired()) {
            return Ok(false);
        }
        entries.insert(key.to_string(), StoredEntry::new(value, ttl));
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.lock_entries();
        Ok(entries.remove(key).is_some())
    }
}

// == Memory Item Store ==
/// In-memory item store implementing the `ItemStore` contract.
///
/// Tracks point-fetch and batch-fetch call counts, and exposes an
/// availability toggle, so callers can assert how often and whether the
/// caching layer reached the store.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    items: Mutex<HashMap<u64, Item>>,
    next_id: AtomicU64,
    fetch_calls: AtomicU64,
    batch_fetch_calls: AtomicU64,
    unavailable: AtomicBool,
}

impl MemoryItemStore {
    /// Creates an empty item store with ids starting at 1.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    /// Number of point-fetch calls served so far.
    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of batched-fetch calls served so far.
    pub fn batch_fetch_calls(&self) -> u64 {
        self.batch_fetch_calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent read fail, simulating a store outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ServiceError::Store(
                "item store is unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Item>> {
        self.items.lock().expect("item store mutex poisoned")
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn fetch(&self, id: u64) -> Result<Option<Item>> {
        self.check_available()?;
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let items = self.lock_items();
        Ok(items.get(&id).cloned())
    }

    async fn fetch_many(&self, ids: &[u64]) -> Result<Vec<Item>> {
        self.check_available()?;
        self.batch_fetch_calls.fetch_add(1, Ordering::SeqCst);
        let items = self.lock_items();
        Ok(ids.iter().filter_map(|id| items.get(id).cloned()).collect())
    }

    async fn scan_ids(&self, page: usize, page_size: usize) -> Result<Vec<u64>> {
        self.check_available()?;
        let items = self.lock_items();
        let mut ids: Vec<u64> = items.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids
            .into_iter()
            .skip(page * page_size)
            .take(page_size)
            .collect())
    }

    async fn insert(&self, draft: ItemDraft) -> Result<Item> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let item = draft.into_item(id);
        let mut items = self.lock_items();
        items.insert(id, item.clone());
        Ok(item)
    }

    async fn update(&self, item: &Item) -> Result<Option<Item>> {
        let mut items = self.lock_items();
        match items.get_mut(&item.id) {
            Some(existing) => {
                let mut updated = item.clone();
                updated.created_at = existing.created_at;
                updated.updated_at = chrono::Utc::now();
                *existing = updated.clone();
                Ok(Some(updated))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: u64) -> Result<bool> {
        let mut items = self.lock_items();
        Ok(items.remove(&id).is_some())
    }
}
