//! API Routes
//!
//! Configures the Axum router with all catalog service endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    batch_lookup_handler, create_item_handler, delete_item_handler, get_item_handler,
    health_handler, stats_handler, update_item_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /items/:id` - Look up one item
/// - `POST /items/batch` - Look up several items at once
/// - `POST /items` - Create an item
/// - `PUT /items/:id` - Update an item
/// - `DELETE /items/:id` - Delete an item
/// - `GET /stats` - Get caching-layer statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route(
            "/items/:id",
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler),
        )
        .route("/items/batch", post(batch_lookup_handler))
        .route("/items", post(create_item_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
