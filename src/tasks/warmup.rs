//! Filter Warmup Task
//!
//! Supervised background task that builds the membership filter at startup.
//! Request-serving tasks are never blocked by the build: until it completes,
//! the filter's pre-ready policy treats every id as possibly valid, and
//! `MembershipFilter::is_ready` makes the transition observable.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::cache::MembershipFilter;
use crate::config::Config;
use crate::stores::ItemStore;

/// Spawns the membership filter build off the request path.
///
/// The task performs one full paginated id scan of the item store and flips
/// the filter to ready on success. On failure the filter stays in its
/// pre-ready state (all ids possibly valid), so the service degrades to
/// unprotected reads instead of refusing them.
///
/// # Arguments
/// * `filter` - Shared filter handle, also held by the caching layer
/// * `store` - Item store to enumerate
/// * `config` - Source of filter capacity, fp rate and scan page size
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_filter_build_task(
    filter: Arc<MembershipFilter>,
    store: Arc<dyn ItemStore>,
    config: &Config,
) -> JoinHandle<()> {
    let expected = config.filter_expected_items;
    let fp_rate = config.filter_false_positive_rate;
    let page_size = config.filter_page_size;

    tokio::spawn(async move {
        info!(
            "Building membership filter (capacity {}, fp rate {})",
            expected, fp_rate
        );
        match filter
            .build(store.as_ref(), expected, fp_rate, page_size)
            .await
        {
            Ok(loaded) => info!("Membership filter ready with {} ids", loaded),
            Err(e) => error!(
                "Membership filter build failed: {}; serving without pre-filtering",
                e
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemDraft;
    use crate::stores::MemoryItemStore;
    use std::time::Duration;

    fn draft(n: u32) -> ItemDraft {
        ItemDraft {
            name: format!("item-{}", n),
            price: 100,
            image: String::new(),
            brand: String::new(),
            stock: 1,
            description: String::new(),
            categories: vec![],
        }
    }

    #[tokio::test]
    async fn test_warmup_task_flips_readiness() {
        let store = Arc::new(MemoryItemStore::new());
        for n in 0..10 {
            store.insert(draft(n)).await.unwrap();
        }
        let filter = Arc::new(MembershipFilter::new());
        assert!(!filter.is_ready());

        let handle = spawn_filter_build_task(filter.clone(), store.clone(), &Config::default());
        handle.await.unwrap();

        assert!(filter.is_ready());
        for id in 1..=10 {
            assert!(filter.may_exist(id));
        }
    }

    #[tokio::test]
    async fn test_warmup_task_failure_leaves_pre_ready_policy() {
        let store = Arc::new(MemoryItemStore::new());
        store.insert(draft(0)).await.unwrap();
        store.set_unavailable(true);

        let filter = Arc::new(MembershipFilter::new());
        let handle = spawn_filter_build_task(filter.clone(), store.clone(), &Config::default());
        handle.await.unwrap();

        // Build failed: not ready, every id still possibly valid
        assert!(!filter.is_ready());
        assert!(filter.may_exist(99999));
    }

    #[tokio::test]
    async fn test_warmup_task_can_be_aborted() {
        let store = Arc::new(MemoryItemStore::new());
        let filter = Arc::new(MembershipFilter::new());

        let handle = spawn_filter_build_task(filter, store, &Config::default());
        handle.abort();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished());
    }
}
