//! Key Lock Module
//!
//! Per-key distributed mutual exclusion over the shared cache store, used to
//! serialize store-fetch-and-backfill when concurrent readers miss on the
//! same key. The lock record is a short-lived `set_if_absent` entry whose
//! lease TTL releases it even if the holder crashes mid-operation.
//!
//! Acquisition is a bounded retry loop: exhausting the attempt budget
//! surfaces a typed `LockTimeout`, never an unbounded wait. The wall-clock
//! bound (attempts x retry delay) is deliberately much shorter than the
//! lease duration.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::stores::CacheStore;

/// Value stored under a lock key. Release deletes unconditionally, so the
/// content only matters for debugging.
const LOCK_TOKEN: &str = "1";

// == Key Lock ==
/// Per-key lock manager backed by the shared cache store.
pub struct KeyLock {
    cache: Arc<dyn CacheStore>,
    lease: Duration,
    retry_delay: Duration,
    max_attempts: u32,
}

impl KeyLock {
    // == Constructor ==
    /// Creates a lock manager.
    ///
    /// # Arguments
    /// * `cache` - Shared cache store providing atomic `set_if_absent`
    /// * `lease` - Lock record TTL; safety valve against crashed holders
    /// * `retry_delay` - Sleep between acquisition attempts
    /// * `max_attempts` - Attempt budget before reporting a timeout
    pub fn new(
        cache: Arc<dyn CacheStore>,
        lease: Duration,
        retry_delay: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            cache,
            lease,
            retry_delay,
            max_attempts,
        }
    }

    // == Try Acquire ==
    /// Single atomic acquisition attempt.
    ///
    /// Returns false if another holder currently owns the key.
    pub async fn try_acquire(&self, key: &str) -> Result<bool> {
        self.cache.set_if_absent(key, LOCK_TOKEN, self.lease).await
    }

    // == Acquire ==
    /// Acquires the lock, retrying with a short async sleep between
    /// attempts.
    ///
    /// Exhausting the attempt budget returns `ServiceError::LockTimeout`.
    /// Unrelated keys never contend: the lock is scoped to exactly one key.
    pub async fn acquire(&self, key: &str) -> Result<()> {
        for attempt in 1..=self.max_attempts {
            if self.try_acquire(key).await? {
                return Ok(());
            }
            debug!(
                "Lock busy for {} (attempt {}/{})",
                key, attempt, self.max_attempts
            );
            tokio::time::sleep(self.retry_delay).await;
        }
        Err(ServiceError::LockTimeout(key.to_string()))
    }

    // == Release ==
    /// Releases the lock by deleting its record.
    ///
    /// Unconditional: also succeeds if the lease already expired.
    pub async fn release(&self, key: &str) -> Result<()> {
        self.cache.delete(key).await?;
        Ok(())
    }
}
