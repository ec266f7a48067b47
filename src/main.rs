//! Catalog Cache - an item lookup service with a protected read-through cache
//!
//! Runs the service against in-memory collaborators: an in-memory TTL cache
//! store and an in-memory item store behind the same contracts a shared
//! cache and a relational store would implement.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_cache::api::{create_router, AppState};
use catalog_cache::cache::{ItemCache, MembershipFilter};
use catalog_cache::config::Config;
use catalog_cache::stores::{ItemStore, MemoryCacheStore, MemoryItemStore};
use catalog_cache::tasks::{spawn_cleanup_task, spawn_filter_build_task};

/// Main entry point for the catalog cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache store, item store and membership filter
/// 4. Start the background filter build and TTL cleanup tasks
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Catalog Cache Service");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, item_ttl={}s, negative_ttl={}..{}s, lock={}sx{} attempts",
        config.server_port,
        config.item_ttl,
        config.negative_ttl_min,
        config.negative_ttl_max,
        config.lock_lease,
        config.lock_max_attempts
    );

    // Create the collaborators and the caching layer
    let cache_store = Arc::new(MemoryCacheStore::new());
    let item_store = Arc::new(MemoryItemStore::new());
    let filter = Arc::new(MembershipFilter::new());
    let items = Arc::new(ItemCache::new(
        cache_store.clone(),
        item_store.clone(),
        filter.clone(),
        &config,
    ));
    let state = AppState::new(items);
    info!("Caching layer initialized");

    // Build the membership filter off the request path; until it completes,
    // lookups follow the pre-ready policy (every id possibly valid)
    let warmup_handle =
        spawn_filter_build_task(filter, item_store.clone() as Arc<dyn ItemStore>, &config);

    // Start background cleanup task for the in-memory cache store
    let cleanup_handle = spawn_cleanup_task(cache_store.clone(), config.cleanup_interval);
    info!("Background tasks started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(warmup_handle, cleanup_handle))
        .await
        .unwrap();

    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the background tasks and allows graceful
/// shutdown.
async fn shutdown_signal(
    warmup_handle: tokio::task::JoinHandle<()>,
    cleanup_handle: tokio::task::JoinHandle<()>,
) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the background tasks
    warmup_handle.abort();
    cleanup_handle.abort();
    warn!("Background tasks aborted");
}
