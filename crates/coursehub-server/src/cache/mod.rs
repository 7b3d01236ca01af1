//! Cache coordination tier for the catalog service.
//!
//! ## Architecture
//!
//! - [`CacheBackend`] - key-value store: in-process map or shared Redis
//! - [`CacheClient`] - fault-tolerant surface; every failure degrades to the
//!   cold path (miss / no-op / zero), never to an error
//! - [`ViewCounters`] - approximate per-course view counts
//! - [`PublishedCoursesCache`] - cache-aside snapshot of published courses
//!   plus the write-side invalidation protocol
//!
//! ## Graceful degradation
//!
//! If Redis is disabled or unreachable at startup, the tier falls back to
//! the in-process memory backend, and any individual backend failure at
//! runtime reads as a cache miss. The store remains the source of truth
//! throughout; a cache outage costs latency only.

pub mod backend;
pub mod client;
pub mod collection;
pub mod counter;

pub use backend::{CacheBackend, CacheError};
pub use client::CacheClient;
pub use collection::PublishedCoursesCache;
pub use counter::ViewCounters;

use crate::config::RedisConfig;

/// Create a cache backend based on configuration.
///
/// - Redis disabled: in-process memory backend
/// - Redis enabled: connect through a pool, verified with a `PING`; any
///   failure falls back to the memory backend so the server still starts
pub async fn create_backend(config: &RedisConfig) -> CacheBackend {
    use std::time::Duration;

    if !config.enabled {
        tracing::info!("Redis disabled, using in-process cache");
        return CacheBackend::new_memory();
    }

    tracing::info!(url = %config.url, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));
    redis_config.pool = Some(pool_config);

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create Redis pool. Falling back to in-process cache."
            );
            return CacheBackend::new_memory();
        }
    };

    match pool.get().await {
        Ok(mut conn) => match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => {
                tracing::info!("Connected to Redis");
                CacheBackend::new_redis(pool)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Redis PING failed. Falling back to in-process cache."
                );
                CacheBackend::new_memory()
            }
        },
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to connect to Redis. Falling back to in-process cache."
            );
            CacheBackend::new_memory()
        }
    }
}
