//! Response DTOs for the catalog service API
//!
//! Defines the structure of outgoing HTTP response bodies. Item lookups
//! serialize the `Item` record directly; the DTOs here cover mutations,
//! batch results and operational endpoints.

use std::collections::HashMap;

use serde::Serialize;

use crate::cache::StatsSnapshot;
use crate::models::Item;

/// Response body for the create operation (POST /items)
#[derive(Debug, Clone, Serialize)]
pub struct CreateItemResponse {
    /// Success message
    pub message: String,
    /// The assigned item id
    pub id: u64,
}

impl CreateItemResponse {
    /// Creates a new CreateItemResponse
    pub fn new(id: u64) -> Self {
        Self {
            message: format!("Item {} created successfully", id),
            id,
        }
    }
}

/// Response body for the delete operation (DELETE /items/:id)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteItemResponse {
    /// Success message
    pub message: String,
    /// The deleted item id
    pub id: u64,
}

impl DeleteItemResponse {
    /// Creates a new DeleteItemResponse
    pub fn new(id: u64) -> Self {
        Self {
            message: format!("Item {} deleted successfully", id),
            id,
        }
    }
}

/// Response body for a batched lookup (POST /items/batch)
///
/// Partial by design: requested ids unknown to both cache and store are
/// omitted rather than reported as errors.
#[derive(Debug, Clone, Serialize)]
pub struct BatchLookupResponse {
    /// Resolved items keyed by id
    pub items: HashMap<u64, Item>,
    /// Number of requested ids
    pub requested: usize,
    /// Number of resolved ids
    pub resolved: usize,
}

impl BatchLookupResponse {
    /// Creates a new BatchLookupResponse
    pub fn new(requested: usize, items: HashMap<u64, Item>) -> Self {
        let resolved = items.len();
        Self {
            items,
            requested,
            resolved,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits on item entries
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of hits on negative (known-invalid) entries
    pub negative_hits: u64,
    /// Number of lookups rejected by the membership filter
    pub filter_rejections: u64,
    /// Number of point fetches issued to the backing store
    pub store_fetches: u64,
    /// Number of lock acquisitions that exhausted their retry budget
    pub lock_timeouts: u64,
    /// Number of lock releases that failed and were left to the lease TTL
    pub lock_release_failures: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Whether the membership filter has finished building
    pub filter_ready: bool,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a stats snapshot
    pub fn new(snapshot: StatsSnapshot, filter_ready: bool) -> Self {
        let total_requests = snapshot.hits + snapshot.misses;
        let hit_rate = if total_requests > 0 {
            snapshot.hits as f64 / total_requests as f64
        } else {
            0.0
        };
        Self {
            hits: snapshot.hits,
            misses: snapshot.misses,
            negative_hits: snapshot.negative_hits,
            filter_rejections: snapshot.filter_rejections,
            store_fetches: snapshot.store_fetches,
            lock_timeouts: snapshot.lock_timeouts,
            lock_release_failures: snapshot.lock_release_failures,
            hit_rate,
            filter_ready,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_response_serialize() {
        let resp = CreateItemResponse::new(17);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("17"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteItemResponse::new(9);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("deleted"));
    }

    #[test]
    fn test_batch_response_counts() {
        let resp = BatchLookupResponse::new(3, HashMap::new());
        assert_eq!(resp.requested, 3);
        assert_eq!(resp.resolved, 0);
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let snapshot = StatsSnapshot {
            hits: 80,
            misses: 20,
            negative_hits: 5,
            filter_rejections: 3,
            store_fetches: 20,
            lock_timeouts: 1,
            lock_release_failures: 0,
        };
        let resp = StatsResponse::new(snapshot, true);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert!(resp.filter_ready);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(StatsSnapshot::default(), false);
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
