//! Membership Filter Module
//!
//! Probabilistic gate that answers whether an item id could possibly exist,
//! built once per process lifetime from a full scan of the backing store.
//! Ids it rejects never reach the cache or the store, which closes the cache
//! penetration path for fabricated keys.
//!
//! Guarantee: no false negatives. Every id present in the store at build
//! time (or inserted through `insert` afterwards) tests positive. False
//! positives occur at the configured rate and only cost a store round-trip.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use probabilistic_collections::bloom::BloomFilter;
use tracing::{debug, info};

use crate::error::Result;
use crate::stores::ItemStore;

// == Membership Filter ==
/// Bloom-filter membership gate over the set of valid item ids.
///
/// Owned and lifecycle-managed: created empty at startup, populated by a
/// supervised background task, and handed to readers by `Arc`. Readers that
/// query before the build completes get the explicit pre-ready policy:
/// every id is treated as possibly valid, trading store protection for
/// availability during warm-up.
pub struct MembershipFilter {
    inner: RwLock<Option<BloomFilter<u64>>>,
    ready: AtomicBool,
}

impl MembershipFilter {
    // == Constructor ==
    /// Creates an empty, not-yet-ready filter.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
            ready: AtomicBool::new(false),
        }
    }

    // == Build ==
    /// Populates the filter from a full paginated scan of the item store.
    ///
    /// Runs once, off the request path. Loops pages until the store returns
    /// an empty one, so the whole key space is covered regardless of size.
    /// Returns the number of ids loaded.
    ///
    /// # Arguments
    /// * `store` - Item store to enumerate
    /// * `expected_items` - Capacity hint for the bloom filter
    /// * `false_positive_rate` - Tolerated false-positive rate
    /// * `page_size` - Ids fetched per scan page
    pub async fn build(
        &self,
        store: &dyn ItemStore,
        expected_items: usize,
        false_positive_rate: f64,
        page_size: usize,
    ) -> Result<usize> {
        let mut filter = BloomFilter::<u64>::new(expected_items.max(1), false_positive_rate);
        let mut page = 0;
        let mut loaded = 0;

        loop {
            let ids = store.scan_ids(page, page_size).await?;
            if ids.is_empty() {
                break;
            }
            debug!("Filter build: page {} with {} ids", page, ids.len());
            for id in &ids {
                filter.insert(id);
            }
            loaded += ids.len();
            page += 1;
        }

        {
            let mut inner = self.inner.write().expect("filter lock poisoned");
            *inner = Some(filter);
        }
        self.ready.store(true, Ordering::SeqCst);
        info!("Membership filter built with {} ids", loaded);

        Ok(loaded)
    }

    // == May Exist ==
    /// Non-blocking membership test.
    ///
    /// Returns false only when the built filter rules the id out. Before the
    /// build completes every id answers true (pre-ready policy).
    pub fn may_exist(&self, id: u64) -> bool {
        let inner = self.inner.read().expect("filter lock poisoned");
        match inner.as_ref() {
            Some(filter) => filter.contains(&id),
            None => true,
        }
    }

    // == Insert ==
    /// Adds an id created after the build, keeping the no-false-negative
    /// guarantee for post-startup items.
    ///
    /// A no-op before the build completes: the build's store scan will pick
    /// the id up.
    pub fn insert(&self, id: u64) {
        let mut inner = self.inner.write().expect("filter lock poisoned");
        if let Some(filter) = inner.as_mut() {
            filter.insert(&id);
        }
    }

    // == Readiness ==
    /// Returns true once the background build has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

impl Default for MembershipFilter {
    fn default() -> Self {
        Self::new()
    }
}
