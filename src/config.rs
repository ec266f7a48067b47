//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds for cached item entries
    pub item_ttl: u64,
    /// Lower bound in seconds for the jittered negative-entry TTL
    pub negative_ttl_min: u64,
    /// Upper bound in seconds for the jittered negative-entry TTL (exclusive)
    pub negative_ttl_max: u64,
    /// Lease duration in seconds for per-key locks
    pub lock_lease: u64,
    /// Delay in milliseconds between lock acquisition attempts
    pub lock_retry_delay_ms: u64,
    /// Maximum number of lock acquisition attempts before reporting a timeout
    pub lock_max_attempts: u32,
    /// Timeout in milliseconds applied to each cache/store round-trip
    pub op_timeout_ms: u64,
    /// Expected number of item ids inserted into the membership filter
    pub filter_expected_items: usize,
    /// Tolerated false-positive rate of the membership filter
    pub filter_false_positive_rate: f64,
    /// Page size used when scanning the store to build the membership filter
    pub filter_page_size: usize,
    /// Background cache cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `ITEM_TTL` - Item entry TTL in seconds (default: 1800)
    /// - `NEGATIVE_TTL_MIN` / `NEGATIVE_TTL_MAX` - Jitter window in seconds
    ///   for negative entries (default: 300..500)
    /// - `LOCK_LEASE` - Lock lease in seconds (default: 10)
    /// - `LOCK_RETRY_DELAY_MS` - Delay between lock attempts (default: 50)
    /// - `LOCK_MAX_ATTEMPTS` - Lock attempts before timeout (default: 20)
    /// - `OP_TIMEOUT_MS` - Per-operation timeout (default: 2000)
    /// - `FILTER_EXPECTED_ITEMS` - Filter capacity (default: 80000)
    /// - `FILTER_FALSE_POSITIVE_RATE` - Filter fp rate (default: 0.05)
    /// - `FILTER_PAGE_SIZE` - Scan page size for the filter build (default: 1000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            server_port: env_or("SERVER_PORT", 3000),
            item_ttl: env_or("ITEM_TTL", 1800),
            negative_ttl_min: env_or("NEGATIVE_TTL_MIN", 300),
            negative_ttl_max: env_or("NEGATIVE_TTL_MAX", 500),
            lock_lease: env_or("LOCK_LEASE", 10),
            lock_retry_delay_ms: env_or("LOCK_RETRY_DELAY_MS", 50),
            lock_max_attempts: env_or("LOCK_MAX_ATTEMPTS", 20),
            op_timeout_ms: env_or("OP_TIMEOUT_MS", 2000),
            filter_expected_items: env_or("FILTER_EXPECTED_ITEMS", 80_000),
            filter_false_positive_rate: env_or("FILTER_FALSE_POSITIVE_RATE", 0.05),
            filter_page_size: env_or("FILTER_PAGE_SIZE", 1000),
            cleanup_interval: env_or("CLEANUP_INTERVAL", 1),
        }
    }
}

/// Reads an environment variable, falling back to a default on absence or
/// parse failure.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            item_ttl: 1800,
            negative_ttl_min: 300,
            negative_ttl_max: 500,
            lock_lease: 10,
            lock_retry_delay_ms: 50,
            lock_max_attempts: 20,
            op_timeout_ms: 2000,
            filter_expected_items: 80_000,
            filter_false_positive_rate: 0.05,
            filter_page_size: 1000,
            cleanup_interval: 1,
        }
    }
}
