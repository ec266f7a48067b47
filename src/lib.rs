//! Catalog Cache - an item lookup service with a protected read-through cache
//!
//! Shields the backing item store from cache penetration (bloom-filter
//! membership gate plus negative caching) and cache stampede (per-key
//! distributed locking with bounded retries).

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod stores;
pub mod tasks;

pub use api::AppState;
pub use cache::ItemCache;
pub use config::Config;
pub use tasks::{spawn_cleanup_task, spawn_filter_build_task};
