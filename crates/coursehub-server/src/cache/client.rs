//! Fault-tolerant key-value client: the cache tier's public surface.

use std::time::Duration;

use super::backend::CacheBackend;

/// Thin fault-tolerant wrapper over the cache backend.
///
/// Every operation is best-effort and non-failing: a backend error is logged
/// here and collapsed into the documented neutral result (miss / no-op /
/// `false` / absent / 0). Callers cannot distinguish "never cached" from
/// "cache unreachable" - both mean "recompute from the source of truth" - so
/// a cache outage costs latency, never correctness or availability.
///
/// This is the only place in the tier where cache errors are absorbed;
/// everything below returns them typed, everything above never sees them.
#[derive(Clone)]
pub struct CacheClient {
    backend: CacheBackend,
}

impl CacheClient {
    /// Create a client over the given backend.
    pub fn new(backend: CacheBackend) -> Self {
        Self { backend }
    }

    /// Store `value` at `key` with the given TTL. Failure is a no-op; the
    /// value is simply not cached.
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        match self.backend.set(key, value, ttl).await {
            Ok(()) => tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "cache set"),
            Err(e) => tracing::warn!(key = %key, error = %e, "cache SET failed, value not cached"),
        }
    }

    /// Get the value at `key`. Absent on both "never set" and "backend
    /// unreachable".
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache GET failed, treating as miss");
                None
            }
        }
    }

    /// Remove `key`. Failure is a no-op; a lingering stale entry self-heals
    /// when its TTL elapses.
    pub async fn delete(&self, key: &str) {
        match self.backend.delete(key).await {
            Ok(()) => tracing::debug!(key = %key, "cache key deleted"),
            Err(e) => tracing::warn!(key = %key, error = %e, "cache DEL failed"),
        }
    }

    /// Check whether `key` is set. Failure reads as `false`.
    pub async fn exists(&self, key: &str) -> bool {
        match self.backend.exists(key).await {
            Ok(present) => present,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache EXISTS failed, treating as absent");
                false
            }
        }
    }

    /// Atomically increment the counter at `key`. Absent on failure.
    pub async fn incr(&self, key: &str) -> Option<i64> {
        match self.backend.incr(key).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache INCR failed");
                None
            }
        }
    }

    /// Atomically increment the counter at `key`, refreshing its expiry
    /// window. Absent on failure.
    pub async fn incr_expire(&self, key: &str, window: Duration) -> Option<i64> {
        match self.backend.incr_expire(key, window).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache INCR failed");
                None
            }
        }
    }

    /// Read the counter at `key` as an integer. Absent, unreachable and
    /// unparseable all read as 0.
    pub async fn counter(&self, key: &str) -> i64 {
        let Some(raw) = self.get(key).await else {
            return 0;
        };
        match raw.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key = %key, value = %raw, "counter value is not an integer, reading as 0");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::backend::CacheBackend;

    fn memory_client() -> CacheClient {
        CacheClient::new(CacheBackend::new_memory())
    }

    #[tokio::test]
    async fn test_get_set_roundtrip() {
        let client = memory_client();
        client.set("key", "value", Duration::from_secs(60)).await;
        assert_eq!(client.get("key").await, Some("value".to_string()));
        assert!(client.exists("key").await);
    }

    #[tokio::test]
    async fn test_counter_absent_reads_zero() {
        let client = memory_client();
        assert_eq!(client.counter("counter").await, 0);
    }

    #[tokio::test]
    async fn test_counter_reads_incremented_value() {
        let client = memory_client();
        assert_eq!(client.incr("counter").await, Some(1));
        assert_eq!(client.incr("counter").await, Some(2));
        assert_eq!(client.counter("counter").await, 2);
    }

    #[tokio::test]
    async fn test_counter_garbage_reads_zero() {
        let client = memory_client();
        client
            .set("counter", "not-a-number", Duration::from_secs(60))
            .await;
        assert_eq!(client.counter("counter").await, 0);
    }

    #[tokio::test]
    async fn test_incr_on_garbage_is_absent() {
        let client = memory_client();
        client
            .set("counter", "not-a-number", Duration::from_secs(60))
            .await;
        assert_eq!(client.incr("counter").await, None);
    }
}
