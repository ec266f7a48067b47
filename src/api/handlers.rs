//! API Handlers
//!
//! HTTP request handlers for each catalog service endpoint. Handlers are a
//! thin shaping layer: every item read and write goes through the caching
//! layer's defined paths, never directly to the stores.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::ItemCache;
use crate::error::{Result, ServiceError};
use crate::models::{
    BatchLookupRequest, BatchLookupResponse, CreateItemRequest, CreateItemResponse,
    DeleteItemResponse, HealthResponse, Item, StatsResponse, UpdateItemRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The caching layer fronting the item store
    pub items: Arc<ItemCache>,
}

impl AppState {
    /// Creates a new AppState over the given caching layer.
    pub fn new(items: Arc<ItemCache>) -> Self {
        Self { items }
    }
}

/// Handler for GET /items/:id
///
/// Resolves a single item through the read-through cache.
pub async fn get_item_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Item>> {
    match state.items.get_one(id).await? {
        Some(item) => Ok(Json(item)),
        None => Err(ServiceError::NotFound(id)),
    }
}

/// Handler for POST /items/batch
///
/// Resolves several items at once; unknown ids are omitted from the result.
pub async fn batch_lookup_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchLookupRequest>,
) -> Result<Json<BatchLookupResponse>> {
    let requested = req.ids.len();
    let items = state.items.get_many(&req.ids).await?;
    Ok(Json(BatchLookupResponse::new(requested, items)))
}

/// Handler for POST /items
///
/// Creates an item and warms its cache entry.
pub async fn create_item_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> Result<Json<CreateItemResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let item = state.items.insert(req.into_draft()).await?;
    Ok(Json(CreateItemResponse::new(item.id)))
}

/// Handler for PUT /items/:id
///
/// Replaces an item's attributes and refreshes its cache entry.
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<Item>> {
    if let Some(error_msg) = req.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    // Fetch the current record to keep timestamps; the store owns them
    let current = state
        .items
        .get_one(id)
        .await?
        .ok_or(ServiceError::NotFound(id))?;

    let replacement = Item {
        id,
        name: req.name,
        price: req.price,
        image: req.image,
        brand: req.brand,
        stock: req.stock,
        description: req.description,
        categories: req.categories,
        created_at: current.created_at,
        updated_at: current.updated_at,
    };

    match state.items.update(replacement).await? {
        Some(committed) => Ok(Json(committed)),
        None => Err(ServiceError::NotFound(id)),
    }
}

/// Handler for DELETE /items/:id
///
/// Deletes the store record and drops the cache entry.
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteItemResponse>> {
    if state.items.remove(id).await? {
        Ok(Json(DeleteItemResponse::new(id)))
    } else {
        Err(ServiceError::NotFound(id))
    }
}

/// Handler for GET /stats
///
/// Returns current caching-layer statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = state.items.stats();
    let filter_ready = state.items.filter_ready();
    Json(StatsResponse::new(snapshot, filter_ready))
}

/// Handler for GET /health
///
/// Returns health status of the service.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
