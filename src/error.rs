//! Error types for the catalog cache service
//!
//! Provides unified error handling using thiserror.
//!
//! A legitimate "no such item" is not an error: core lookups return
//! `Ok(None)` and only the HTTP layer turns that into a 404. The variants
//! here cover real failures that must stay distinguishable from not-found.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Service Error Enum ==
/// Unified error type for the catalog cache service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Item not found (HTTP mapping for an `Ok(None)` lookup)
    #[error("Item not found: {0}")]
    NotFound(u64),

    /// Per-key lock could not be acquired within the retry budget.
    /// Retryable; never an unbounded wait.
    #[error("Lock acquisition timed out for key: {0}")]
    LockTimeout(String),

    /// Backing store call failed or timed out
    #[error("Backing store unavailable: {0}")]
    Store(String),

    /// Cache store call failed or timed out
    #[error("Cache store unavailable: {0}")]
    Cache(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Item not found: {}", id))
            }
            ServiceError::LockTimeout(key) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Busy, retry later: {}", key),
            ),
            ServiceError::Store(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ServiceError::Cache(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ServiceError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServiceError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the catalog cache service.
pub type Result<T> = std::result::Result<T, ServiceError>;
