//! Integration Tests for the Caching Layer
//!
//! Exercises the penetration and stampede protections end to end against
//! the in-memory collaborators: store-free rejection of invalid ids,
//! single-fetch guarantees under concurrency, bulk reconciliation, TTL
//! expiry and failure propagation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use catalog_cache::cache::{item_key, lock_key, CachedValue, ItemCache, MembershipFilter};
use catalog_cache::config::Config;
use catalog_cache::error::ServiceError;
use catalog_cache::models::ItemDraft;
use catalog_cache::stores::{CacheStore, ItemStore, MemoryCacheStore, MemoryItemStore};

// == Helper Functions ==

struct Harness {
    cache: Arc<MemoryCacheStore>,
    store: Arc<MemoryItemStore>,
    filter: Arc<MembershipFilter>,
    items: Arc<ItemCache>,
}

fn draft(name: &str) -> ItemDraft {
    ItemDraft {
        name: name.to_string(),
        price: 2500,
        image: "img.png".to_string(),
        brand: "Acme".to_string(),
        stock: 10,
        description: "test item".to_string(),
        categories: vec!["misc".to_string()],
    }
}

/// Builds a caching layer over fresh in-memory stores, seeds `seed` items
/// and completes the filter build.
async fn harness_with(config: Config, seed: usize) -> (Harness, Vec<u64>) {
    let cache = Arc::new(MemoryCacheStore::new());
    let store = Arc::new(MemoryItemStore::new());
    let filter = Arc::new(MembershipFilter::new());

    let mut ids = Vec::new();
    for n in 0..seed {
        let item = store.insert(draft(&format!("item-{}", n))).await.unwrap();
        ids.push(item.id);
    }
    filter.build(store.as_ref(), 1000, 0.001, 64).await.unwrap();

    let items = Arc::new(ItemCache::new(
        cache.clone(),
        store.clone(),
        filter.clone(),
        &config,
    ));
    (
        Harness {
            cache,
            store,
            filter,
            items,
        },
        ids,
    )
}

fn fast_lock_config() -> Config {
    Config {
        lock_retry_delay_ms: 5,
        lock_max_attempts: 200,
        ..Config::default()
    }
}

/// Finds an id the built filter rules out. Guaranteed to exist nearby since
/// the false-positive rate is far below 1.
fn rejected_id(filter: &MembershipFilter) -> u64 {
    (1_000_000..2_000_000)
        .find(|id| !filter.may_exist(*id))
        .expect("no rejected id within range")
}

// == Penetration Protection ==

#[tokio::test]
async fn test_invalid_id_never_reaches_the_store() {
    let (h, _ids) = harness_with(Config::default(), 5).await;
    let bad_id = rejected_id(&h.filter);

    for _ in 0..10 {
        assert!(h.items.get_one(bad_id).await.unwrap().is_none());
    }

    assert_eq!(h.store.fetch_calls(), 0);
    assert_eq!(h.store.batch_fetch_calls(), 0);

    // A jittered negative marker was left behind
    let raw = h.cache.get(&item_key(bad_id)).await.unwrap().unwrap();
    assert!(CachedValue::decode(&raw).unwrap().is_negative());
}

#[tokio::test]
async fn test_no_false_negatives_for_seeded_ids() {
    let (h, ids) = harness_with(Config::default(), 300).await;
    for id in ids {
        assert!(h.filter.may_exist(id), "id {} must test positive", id);
    }
}

#[tokio::test]
async fn test_negative_marker_absorbs_bulk_lookups() {
    let (h, _ids) = harness_with(Config::default(), 5).await;
    let bad_id = rejected_id(&h.filter);

    // Single-key path writes the marker...
    h.items.get_one(bad_id).await.unwrap();
    // ...and the bulk path (which skips the filter) resolves from it
    let result = h.items.get_many(&[bad_id]).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(h.store.batch_fetch_calls(), 0);
}

// == Stampede Protection ==

#[tokio::test]
async fn test_concurrent_cold_lookups_issue_one_store_fetch() {
    let (h, ids) = harness_with(fast_lock_config(), 1).await;
    let id = ids[0];

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let items = h.items.clone();
        tasks.push(tokio::spawn(async move { items.get_one(id).await }));
    }

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap().unwrap().unwrap());
    }

    // All twenty callers were served by a single store fetch
    assert_eq!(h.store.fetch_calls(), 1);

    // Only the caller that fetched counts as a miss; every waiter that
    // resolved from the backfilled entry counts as a hit
    let stats = h.items.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 19);

    let expected = h.store.fetch(id).await.unwrap().unwrap();
    for found in results {
        assert_eq!(found, expected);
    }
}

#[tokio::test]
async fn test_lock_timeout_surfaces_within_bounded_latency() {
    let config = Config {
        lock_retry_delay_ms: 10,
        lock_max_attempts: 5,
        ..Config::default()
    };
    let (h, ids) = harness_with(config, 1).await;
    let id = ids[0];

    // Hold the lock for longer than the whole retry budget
    h.cache
        .set_if_absent(&lock_key(id), "other-holder", Duration::from_secs(60))
        .await
        .unwrap();

    let start = Instant::now();
    let result = h.items.get_one(id).await;
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(ServiceError::LockTimeout(_))));
    assert!(elapsed < Duration::from_secs(2), "latency must stay bounded");
    assert_eq!(h.store.fetch_calls(), 0);
}

// == Bulk Reconciliation ==

#[tokio::test]
async fn test_bulk_lookup_partitions_hits_misses_and_invalid() {
    let (h, ids) = harness_with(Config::default(), 2).await;
    let (cached_id, uncached_id) = (ids[0], ids[1]);
    let bad_id = rejected_id(&h.filter);

    // Warm exactly one of the two valid ids
    h.items.get_one(cached_id).await.unwrap();
    let point_fetches = h.store.fetch_calls();

    let result = h
        .items
        .get_many(&[cached_id, uncached_id, bad_id])
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[&cached_id].name, "item-0");
    assert_eq!(result[&uncached_id].name, "item-1");
    assert!(!result.contains_key(&bad_id));

    // Exactly one batched fetch for the misses, no extra point fetches
    assert_eq!(h.store.batch_fetch_calls(), 1);
    assert_eq!(h.store.fetch_calls(), point_fetches);

    // The miss was backfilled: a rerun stays store-free
    let rerun = h.items.get_many(&[cached_id, uncached_id]).await.unwrap();
    assert_eq!(rerun.len(), 2);
    assert_eq!(h.store.batch_fetch_calls(), 1);
}

#[tokio::test]
async fn test_bulk_lookup_of_only_unknown_ids_is_empty_not_an_error() {
    let (h, _ids) = harness_with(Config::default(), 1).await;
    // Ids the filter would reject still flow through the bulk path
    let result = h.items.get_many(&[111_111, 222_222]).await.unwrap();
    assert!(result.is_empty());
}

// == Write Paths ==

#[tokio::test]
async fn test_update_twice_is_idempotent() {
    let (h, ids) = harness_with(Config::default(), 1).await;
    let id = ids[0];

    let current = h.items.get_one(id).await.unwrap().unwrap();
    let mut replacement = current.clone();
    replacement.price = 4200;
    replacement.categories = vec!["sale".to_string()];

    let first = h.items.update(replacement.clone()).await.unwrap().unwrap();
    let second = h.items.update(replacement).await.unwrap().unwrap();

    assert_eq!(first.price, second.price);
    assert_eq!(first.categories, second.categories);

    // The cache entry equals the committed projection
    let raw = h.cache.get(&item_key(id)).await.unwrap().unwrap();
    match CachedValue::decode(&raw).unwrap() {
        CachedValue::Present(cached) => {
            assert_eq!(cached.price, 4200);
            assert_eq!(cached.categories, vec!["sale".to_string()]);
        }
        CachedValue::Missing => panic!("expected a present entry"),
    }
}

#[tokio::test]
async fn test_create_then_read_hits_cache() {
    let (h, _ids) = harness_with(Config::default(), 0).await;

    let item = h.items.insert(draft("fresh")).await.unwrap();
    let found = h.items.get_one(item.id).await.unwrap().unwrap();

    assert_eq!(found, item);
    assert_eq!(h.store.fetch_calls(), 0);
}

#[tokio::test]
async fn test_delete_drops_entry_and_later_reads_are_not_found() {
    let (h, ids) = harness_with(Config::default(), 1).await;
    let id = ids[0];

    h.items.get_one(id).await.unwrap();
    assert!(h.items.remove(id).await.unwrap());

    assert!(h.cache.get(&item_key(id)).await.unwrap().is_none());
    // The filter still vouches for the deleted id; the store says no and
    // the lookup resolves to not-found without a negative marker
    assert!(h.items.get_one(id).await.unwrap().is_none());
    assert!(h.cache.get(&item_key(id)).await.unwrap().is_none());
}

// == TTL Expiry ==

#[tokio::test]
async fn test_entry_expires_after_its_ttl() {
    let config = Config {
        item_ttl: 1,
        ..Config::default()
    };
    let (h, ids) = harness_with(config, 1).await;
    let id = ids[0];

    h.items.get_one(id).await.unwrap();
    assert!(h.cache.get(&item_key(id)).await.unwrap().is_some());
    assert_eq!(h.store.fetch_calls(), 1);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(h.cache.get(&item_key(id)).await.unwrap().is_none());

    // The next lookup refetches and backfills again
    assert!(h.items.get_one(id).await.unwrap().is_some());
    assert_eq!(h.store.fetch_calls(), 2);
}

// == Failure Propagation ==

#[tokio::test]
async fn test_store_outage_propagates_typed_and_releases_lock() {
    let (h, ids) = harness_with(fast_lock_config(), 1).await;
    let id = ids[0];

    h.store.set_unavailable(true);
    assert!(matches!(
        h.items.get_one(id).await,
        Err(ServiceError::Store(_))
    ));

    // The lock was released on the failure path: recovery needs no lease
    // expiry wait
    h.store.set_unavailable(false);
    let found = h.items.get_one(id).await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn test_pre_ready_filter_lets_lookups_through() {
    let cache = Arc::new(MemoryCacheStore::new());
    let store = Arc::new(MemoryItemStore::new());
    let item = store.insert(draft("early")).await.unwrap();

    // Filter never built: pre-ready policy applies
    let filter = Arc::new(MembershipFilter::new());
    let items = ItemCache::new(
        cache,
        store.clone(),
        filter.clone(),
        &Config::default(),
    );

    assert!(!filter.is_ready());
    let found = items.get_one(item.id).await.unwrap().unwrap();
    assert_eq!(found, item);
}
