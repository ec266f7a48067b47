//! Item Cache Module
//!
//! The read-through/write-invalidate core. `ItemCache` owns every write to
//! an item's cache entry, so the entry shape stays consistent across the
//! single-key path, the bulk path and the mutation hooks.
//!
//! Single-key reads run the full protection pipeline: membership gate,
//! cache probe, per-key lock with a double-checked probe, store fetch,
//! backfill. Bulk reads reconcile one multi-get against one batched store
//! fetch. Mutations write through after the store commit.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::cache::{
    item_key, jittered_negative_ttl, lock_key, CacheStats, CachedValue, KeyLock, MembershipFilter,
    StatsSnapshot,
};
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::models::{Item, ItemDraft};
use crate::stores::{CacheStore, ItemStore};

// == Probe Outcome ==
/// What a cache probe found under an item key.
enum Probe {
    /// A live item entry
    Hit(Item),
    /// A negative marker: the id is known to be invalid
    Negative,
    /// Nothing cached (or an undecodable entry, treated the same)
    Miss,
}

// == Item Cache ==
/// Caching layer over the shared cache store and the backing item store.
pub struct ItemCache {
    cache: Arc<dyn CacheStore>,
    store: Arc<dyn ItemStore>,
    filter: Arc<MembershipFilter>,
    lock: KeyLock,
    stats: CacheStats,
    item_ttl: Duration,
    negative_ttl_min: u64,
    negative_ttl_max: u64,
    op_timeout: Duration,
}

impl ItemCache {
    // == Constructor ==
    /// Creates the caching layer.
    ///
    /// The membership filter is injected so its lifecycle (background build,
    /// readiness) stays owned by the caller.
    pub fn new(
        cache: Arc<dyn CacheStore>,
        store: Arc<dyn ItemStore>,
        filter: Arc<MembershipFilter>,
        config: &Config,
    ) -> Self {
        let lock = KeyLock::new(
            cache.clone(),
            Duration::from_secs(config.lock_lease),
            Duration::from_millis(config.lock_retry_delay_ms),
            config.lock_max_attempts,
        );
        Self {
            cache,
            store,
            filter,
            lock,
            stats: CacheStats::new(),
            item_ttl: Duration::from_secs(config.item_ttl),
            negative_ttl_min: config.negative_ttl_min,
            negative_ttl_max: config.negative_ttl_max,
            op_timeout: Duration::from_millis(config.op_timeout_ms),
        }
    }

    // == Single Lookup ==
    /// Resolves one item by id.
    ///
    /// Pipeline:
    /// 1. Membership gate: ids the filter rules out are answered with a
    ///    jittered negative cache entry and no store traffic.
    /// 2. Cache probe: item hit returns; negative hit resolves to None.
    /// 3. Miss: acquire the per-key lock (bounded retries; exhaustion is a
    ///    typed `LockTimeout`), re-probe under the lock, and only then fetch
    ///    the store and backfill.
    ///
    /// Returns `Ok(None)` for an id without a record; errors are reserved
    /// for lock timeouts and cache/store failures.
    pub async fn get_one(&self, id: u64) -> Result<Option<Item>> {
        let key = item_key(id);

        if !self.filter.may_exist(id) {
            self.stats.record_filter_rejection();
            debug!("Item {} ruled out by membership filter", id);
            // Jittered TTL so bursts of negative entries do not expire at once
            let ttl = jittered_negative_ttl(self.negative_ttl_min, self.negative_ttl_max);
            self.cache_set(&key, &CachedValue::Missing, ttl).await?;
            return Ok(None);
        }

        match self.probe(&key).await? {
            Probe::Hit(item) => {
                self.stats.record_hit();
                return Ok(Some(item));
            }
            Probe::Negative => {
                self.stats.record_negative_hit();
                return Ok(None);
            }
            Probe::Miss => {}
        }

        let lkey = lock_key(id);
        if let Err(e) = self.lock.acquire(&lkey).await {
            if matches!(e, ServiceError::LockTimeout(_)) {
                self.stats.record_lock_timeout();
            }
            return Err(e);
        }

        let result = self.fetch_under_lock(id, &key).await;

        // The lock must come off on every path, including fetch failures;
        // the lease TTL only covers a crashed holder. A failed release is
        // counted and left to the lease: failing the read over it would
        // punish a caller whose item was already resolved.
        if let Err(e) = self.lock.release(&lkey).await {
            self.stats.record_lock_release_failure();
            warn!("Failed to release {}: {}", lkey, e);
        }

        result
    }

    /// Store fetch and backfill, called with the per-key lock held.
    async fn fetch_under_lock(&self, id: u64, key: &str) -> Result<Option<Item>> {
        // Double-checked probe: a waiter that acquires the lock after the
        // first fetcher backfilled must not hit the store again. Such a
        // waiter counts as a hit, not a miss, so a miss is only recorded
        // once the store fetch actually happens.
        match self.probe(key).await? {
            Probe::Hit(item) => {
                self.stats.record_hit();
                return Ok(Some(item));
            }
            Probe::Negative => {
                self.stats.record_negative_hit();
                return Ok(None);
            }
            Probe::Miss => {}
        }

        self.stats.record_miss();
        self.stats.record_store_fetch();
        match self.store_fetch(id).await? {
            Some(item) => {
                self.cache_set(key, &CachedValue::Present(item.clone()), self.item_ttl)
                    .await?;
                Ok(Some(item))
            }
            None => {
                // The filter vouched for this id yet the store has no
                // record: a post-build deletion. No negative marker here,
                // since the marker would mask the id if it reappears.
                warn!(
                    "Item {} passed the membership filter but has no store record",
                    id
                );
                Ok(None)
            }
        }
    }

    // == Bulk Lookup ==
    /// Resolves several items at once, reconciling one cache multi-get
    /// against one batched store fetch for the misses.
    ///
    /// The result is partial: ids unknown to both cache and store are
    /// omitted, never errors. This path takes no per-key locks: concurrent
    /// bulk misses on the same id may fetch redundantly, an intentional
    /// trade-off against lock traffic on wide reads (the single-key path
    /// keeps full stampede protection).
    pub async fn get_many(&self, ids: &[u64]) -> Result<HashMap<u64, Item>> {
        let mut found = HashMap::new();
        if ids.is_empty() {
            return Ok(found);
        }

        let keys: Vec<String> = ids.iter().map(|id| item_key(*id)).collect();
        let slots = self.cache_multi_get(&keys).await?;

        // Partition into hits and misses by position
        let mut missing = Vec::new();
        for (id, slot) in ids.iter().zip(slots) {
            match slot {
                Some(raw) => match CachedValue::decode(&raw) {
                    Ok(CachedValue::Present(item)) => {
                        self.stats.record_hit();
                        found.insert(*id, item);
                    }
                    Ok(CachedValue::Missing) => {
                        self.stats.record_negative_hit();
                    }
                    Err(_) => {
                        warn!("Undecodable cache entry for item {}, refetching", id);
                        missing.push(*id);
                    }
                },
                None => {
                    self.stats.record_miss();
                    missing.push(*id);
                }
            }
        }

        if !missing.is_empty() {
            debug!("Batch lookup: {} of {} ids missed the cache", missing.len(), ids.len());
            let fetched = self.store_fetch_many(&missing).await?;
            for item in fetched {
                self.cache_set(
                    &item_key(item.id),
                    &CachedValue::Present(item.clone()),
                    self.item_ttl,
                )
                .await?;
                found.insert(item.id, item);
            }
        }

        Ok(found)
    }

    // == Create ==
    /// Inserts a new item and write-throughs its cache entry.
    ///
    /// The store write commits first; on failure the cache and filter are
    /// untouched. On success the id joins the membership filter so later
    /// lookups are never false-negative, and the entry is cached so the very
    /// next read hits.
    pub async fn insert(&self, draft: ItemDraft) -> Result<Item> {
        let item = self.store_insert(draft).await?;
        info!("Item {} created", item.id);

        self.filter.insert(item.id);
        self.cache_set(
            &item_key(item.id),
            &CachedValue::Present(item.clone()),
            self.item_ttl,
        )
        .await?;

        Ok(item)
    }

    // == Update ==
    /// Replaces an item's attributes and refreshes its cache entry.
    ///
    /// Ordering: the store update commits first, then the cache entry is
    /// overwritten with the committed record. A reader racing the commit can
    /// still backfill the old value in between; the overwrite replaces it,
    /// and any stale backfill landing after ours expires with the entry TTL.
    ///
    /// Returns `Ok(None)` if no record with the item's id exists.
    pub async fn update(&self, item: Item) -> Result<Option<Item>> {
        let id = item.id;
        let committed = match self.store_update(&item).await? {
            Some(committed) => committed,
            None => return Ok(None),
        };
        info!("Item {} updated", id);

        self.cache_set(
            &item_key(id),
            &CachedValue::Present(committed.clone()),
            self.item_ttl,
        )
        .await?;

        Ok(Some(committed))
    }

    // == Delete ==
    /// Deletes an item from the store and drops its cache entry.
    ///
    /// Store first, then cache. If the cache delete fails after the store
    /// commit the error propagates typed; the entry TTL bounds how long the
    /// stale copy can outlive the record.
    pub async fn remove(&self, id: u64) -> Result<bool> {
        let removed = self.store_remove(id).await?;
        if removed {
            info!("Item {} deleted", id);
        }
        // Drop the entry even if the store had no record; the cache may
        // still hold one from before an out-of-band deletion.
        self.cache_delete(&item_key(id)).await?;
        Ok(removed)
    }

    // == Introspection ==
    /// Current counter values.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Whether the membership filter has finished its startup build.
    pub fn filter_ready(&self) -> bool {
        self.filter.is_ready()
    }

    // == Cache Probe ==
    /// Looks up and decodes an item key in the cache.
    ///
    /// An entry that fails to decode is treated as a miss so the fetch path
    /// overwrites it; a corrupt entry must never wedge reads for its key.
    async fn probe(&self, key: &str) -> Result<Probe> {
        let raw = self
            .with_cache_timeout("get", self.cache.get(key))
            .await?;
        Ok(match raw {
            Some(raw) => match CachedValue::decode(&raw) {
                Ok(CachedValue::Present(item)) => Probe::Hit(item),
                Ok(CachedValue::Missing) => Probe::Negative,
                Err(_) => {
                    warn!("Undecodable cache entry under {}, treating as miss", key);
                    Probe::Miss
                }
            },
            None => Probe::Miss,
        })
    }

    // == Timeout-Wrapped Round-Trips ==
    async fn with_cache_timeout<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        timeout(self.op_timeout, fut)
            .await
            .map_err(|_| ServiceError::Cache(format!("Cache {} timed out", what)))?
    }

    async fn with_store_timeout<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        timeout(self.op_timeout, fut)
            .await
            .map_err(|_| ServiceError::Store(format!("Store {} timed out", what)))?
    }

    async fn cache_set(&self, key: &str, value: &CachedValue, ttl: Duration) -> Result<()> {
        let encoded = value.encode()?;
        self.with_cache_timeout("set", self.cache.set(key, &encoded, ttl))
            .await
    }

    async fn cache_multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        self.with_cache_timeout("multi-get", self.cache.multi_get(keys))
            .await
    }

    async fn cache_delete(&self, key: &str) -> Result<bool> {
        self.with_cache_timeout("delete", self.cache.delete(key))
            .await
    }

    async fn store_fetch(&self, id: u64) -> Result<Option<Item>> {
        self.with_store_timeout("fetch", self.store.fetch(id)).await
    }

    async fn store_fetch_many(&self, ids: &[u64]) -> Result<Vec<Item>> {
        self.with_store_timeout("batch fetch", self.store.fetch_many(ids))
            .await
    }

    async fn store_insert(&self, draft: ItemDraft) -> Result<Item> {
        self.with_store_timeout("insert", self.store.insert(draft))
            .await
    }

    async fn store_update(&self, item: &Item) -> Result<Option<Item>> {
        self.with_store_timeout("update", self.store.update(item))
            .await
    }

    async fn store_remove(&self, id: u64) -> Result<bool> {
        self.with_store_timeout("delete", self.store.remove(id))
            .await
    }
}
