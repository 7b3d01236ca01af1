//! Cache backend with typed, fallible key-value operations.
//!
//! Two modes, selected at startup:
//!
//! - **Memory**: in-process map, used when Redis is disabled or unreachable
//! - **Redis**: remote store reached through a `deadpool-redis` pool
//!
//! Every operation returns `Result<_, CacheError>`; nothing at this layer
//! decides what a failure means. The [`CacheClient`](super::CacheClient)
//! above it is the single place where errors collapse into degraded results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use thiserror::Error;

/// The one error class of the cache tier: the cache is unavailable.
///
/// Variants exist for log detail only; callers treat connectivity failures,
/// command failures and payload corruption identically (degrade to the
/// cold path, per the client's contract).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),

    #[error("cache command error: {0}")]
    Command(String),

    #[error("cache payload error: {0}")]
    Payload(String),
}

/// An entry in the memory backend, expired lazily on access.
#[derive(Clone, Debug)]
pub struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    /// Check if this entry has expired.
    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Key-value cache backend: in-process map or shared Redis.
#[derive(Clone)]
pub enum CacheBackend {
    /// Single-process mode: in-memory map only.
    Memory(Arc<DashMap<String, MemoryEntry>>),

    /// Shared mode: remote Redis reached through a connection pool.
    Redis { pool: Pool },
}

impl CacheBackend {
    /// Create a new in-process memory backend.
    pub fn new_memory() -> Self {
        CacheBackend::Memory(Arc::new(DashMap::new()))
    }

    /// Create a new Redis-backed backend.
    pub fn new_redis(pool: Pool) -> Self {
        CacheBackend::Redis { pool }
    }

    /// Get the value stored at `key`, if present and unexpired.
    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            CacheBackend::Memory(map) => {
                if let Some(entry) = map.get(key) {
                    if !entry.is_expired() {
                        return Ok(Some(entry.value.clone()));
                    }
                    drop(entry);
                    map.remove(key);
                }
                Ok(None)
            }
            CacheBackend::Redis { pool } => {
                let mut conn = redis_conn(pool).await?;
                conn.get::<_, Option<String>>(key)
                    .await
                    .map_err(|e| CacheError::Command(e.to_string()))
            }
        }
    }

    /// Store `value` at `key`, replacing any prior value, expiring after `ttl`.
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        match self {
            CacheBackend::Memory(map) => {
                map.insert(key.to_string(), MemoryEntry::new(value.to_string(), Some(ttl)));
                Ok(())
            }
            CacheBackend::Redis { pool } => {
                let mut conn = redis_conn(pool).await?;
                // SET .. EX rejects 0 seconds.
                let ttl_secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, ttl_secs)
                    .await
                    .map_err(|e| CacheError::Command(e.to_string()))
            }
        }
    }

    /// Remove `key` if present.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            CacheBackend::Memory(map) => {
                map.remove(key);
                Ok(())
            }
            CacheBackend::Redis { pool } => {
                let mut conn = redis_conn(pool).await?;
                conn.del::<_, ()>(key)
                    .await
                    .map_err(|e| CacheError::Command(e.to_string()))
            }
        }
    }

    /// Check whether `key` holds an unexpired value.
    pub async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        match self {
            CacheBackend::Memory(map) => {
                if let Some(entry) = map.get(key) {
                    if !entry.is_expired() {
                        return Ok(true);
                    }
                    drop(entry);
                    map.remove(key);
                }
                Ok(false)
            }
            CacheBackend::Redis { pool } => {
                let mut conn = redis_conn(pool).await?;
                conn.exists::<_, bool>(key)
                    .await
                    .map_err(|e| CacheError::Command(e.to_string()))
            }
        }
    }

    /// Atomically add 1 to the integer at `key`, creating it at 1 if absent.
    ///
    /// Uses the backend's native atomic increment (Redis `INCR`; a sharded
    /// entry lock in memory mode), so concurrent incrementers never lose
    /// updates. A non-integer value at `key` is a payload error.
    pub async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        match self {
            CacheBackend::Memory(map) => Self::memory_incr(map, key, None),
            CacheBackend::Redis { pool } => {
                let mut conn = redis_conn(pool).await?;
                conn.incr::<_, _, i64>(key, 1)
                    .await
                    .map_err(|e| CacheError::Command(e.to_string()))
            }
        }
    }

    /// Atomic increment followed by a best-effort expiry refresh.
    ///
    /// The two steps are not transactional: a failure after the increment
    /// leaves the counter without a refreshed expiry, which is accepted for
    /// approximate counters. The increment result is returned regardless.
    pub async fn incr_expire(&self, key: &str, window: Duration) -> Result<i64, CacheError> {
        match self {
            CacheBackend::Memory(map) => Self::memory_incr(map, key, Some(window)),
            CacheBackend::Redis { pool } => {
                let mut conn = redis_conn(pool).await?;
                let value = conn
                    .incr::<_, _, i64>(key, 1)
                    .await
                    .map_err(|e| CacheError::Command(e.to_string()))?;
                if let Err(e) = conn
                    .expire::<_, i64>(key, window.as_secs().max(1) as i64)
                    .await
                {
                    tracing::warn!(key = %key, error = %e, "failed to refresh counter expiry");
                }
                Ok(value)
            }
        }
    }

    /// Shared increment path for the memory backend. The map's entry guard
    /// serializes concurrent callers on the same key.
    fn memory_incr(
        map: &DashMap<String, MemoryEntry>,
        key: &str,
        window: Option<Duration>,
    ) -> Result<i64, CacheError> {
        let mut entry = map
            .entry(key.to_string())
            .or_insert_with(|| MemoryEntry::new("0".to_string(), None));
        if entry.is_expired() {
            entry.value = "0".to_string();
            entry.expires_at = None;
        }
        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| CacheError::Payload(format!("non-integer value at {key}")))?;
        let next = current + 1;
        entry.value = next.to_string();
        if let Some(window) = window {
            entry.expires_at = Some(Instant::now() + window);
        }
        Ok(next)
    }
}

async fn redis_conn(pool: &Pool) -> Result<deadpool_redis::Connection, CacheError> {
    pool.get()
        .await
        .map_err(|e| CacheError::Connection(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_get_set() {
        let backend = CacheBackend::new_memory();
        backend
            .set("key", "value", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            backend.get("key").await.unwrap(),
            Some("value".to_string())
        );
        assert!(backend.exists("key").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_expiration() {
        let backend = CacheBackend::new_memory();
        backend
            .set("expiring", "value", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(backend.get("expiring").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(backend.get("expiring").await.unwrap().is_none());
        assert!(!backend.exists("expiring").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_delete() {
        let backend = CacheBackend::new_memory();
        backend
            .set("key", "value", Duration::from_secs(60))
            .await
            .unwrap();
        backend.delete("key").await.unwrap();
        assert!(backend.get("key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_incr_creates_at_one() {
        let backend = CacheBackend::new_memory();
        assert_eq!(backend.incr("counter").await.unwrap(), 1);
        assert_eq!(backend.incr("counter").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_memory_incr_non_integer_is_payload_error() {
        let backend = CacheBackend::new_memory();
        backend
            .set("counter", "not-a-number", Duration::from_secs(60))
            .await
            .unwrap();
        let err = backend.incr("counter").await.unwrap_err();
        assert!(matches!(err, CacheError::Payload(_)));
    }

    #[tokio::test]
    async fn test_memory_incr_expire_resets_after_window() {
        let backend = CacheBackend::new_memory();
        let window = Duration::from_millis(50);
        assert_eq!(backend.incr_expire("counter", window).await.unwrap(), 1);
        assert_eq!(backend.incr_expire("counter", window).await.unwrap(), 2);

        tokio::time::sleep(Duration::from_millis(80)).await;
        // Window elapsed with no activity: the counter restarts.
        assert_eq!(backend.incr_expire("counter", window).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_incr_expire_refreshes_window() {
        let backend = CacheBackend::new_memory();
        let window = Duration::from_millis(100);
        backend.incr_expire("counter", window).await.unwrap();

        // Keep the counter warm past the original deadline.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(backend.incr_expire("counter", window).await.unwrap(), 2);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(backend.get("counter").await.unwrap(), Some("2".to_string()));
    }
}
