//! Fault-transparency tests: with the cache backend unreachable, every
//! operation returns its documented degraded result and the catalog stays
//! correct through the store. No cache error ever reaches a caller.

use std::sync::Arc;
use std::time::Duration;

use coursehub_core::CourseStatus;
use coursehub_db_memory::MemoryCatalog;
use coursehub_server::cache::{CacheBackend, CacheClient, PublishedCoursesCache, ViewCounters};
use coursehub_server::catalog::{CatalogService, NewCourse};
use coursehub_server::notifications::LogDispatcher;

/// A Redis backend whose pool points at a port nothing listens on. Every
/// connection attempt fails, exercising the degraded paths without a broker.
fn unreachable_backend() -> CacheBackend {
    let mut config = deadpool_redis::Config::from_url("redis://127.0.0.1:1");
    let mut pool_config = deadpool_redis::PoolConfig::new(2);
    pool_config.timeouts.wait = Some(Duration::from_millis(500));
    pool_config.timeouts.create = Some(Duration::from_millis(500));
    config.pool = Some(pool_config);
    let pool = config
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("pool construction is lazy and must not fail");
    CacheBackend::new_redis(pool)
}

fn failing_client() -> CacheClient {
    CacheClient::new(unreachable_backend())
}

#[tokio::test]
async fn test_client_degrades_every_operation() {
    let client = failing_client();

    client.set("key", "value", Duration::from_secs(60)).await;
    assert_eq!(client.get("key").await, None);
    assert!(!client.exists("key").await);
    client.delete("key").await;
    assert_eq!(client.incr("counter").await, None);
    assert_eq!(
        client.incr_expire("counter", Duration::from_secs(60)).await,
        None
    );
    assert_eq!(client.counter("counter").await, 0);
}

#[tokio::test]
async fn test_coordinator_reads_as_miss() {
    let cache = PublishedCoursesCache::new(failing_client(), Duration::from_secs(300));
    cache.populate(&[]).await;
    assert_eq!(cache.get_cached().await, None);
    // Invalidation against a dead backend is a no-op, not a failure.
    cache.invalidate().await;
    cache
        .on_status_change(CourseStatus::Draft, CourseStatus::Published)
        .await;
}

#[tokio::test]
async fn test_catalog_correct_with_dead_cache() {
    let client = failing_client();
    let service = CatalogService::new(
        Arc::new(MemoryCatalog::new()),
        PublishedCoursesCache::new(client.clone(), Duration::from_secs(300)),
        ViewCounters::new(client, Duration::from_secs(60)),
        Arc::new(LogDispatcher),
    );

    let course = service
        .create_course(NewCourse {
            title: "Resilient".into(),
            description: String::new(),
            image_url: None,
            instructor_id: "teacher-1".into(),
            status: CourseStatus::Published,
        })
        .await
        .unwrap();

    // Every read falls through to the store; results stay correct.
    let listed = service.published_courses().await.unwrap();
    assert_eq!(listed.len(), 1);
    let listed = service.published_courses().await.unwrap();
    assert_eq!(listed.len(), 1);

    // Views are silently lost, never an error.
    let read = service.course(&course.id).await.unwrap();
    assert_eq!(read.id, course.id);
    assert_eq!(service.course_views(&course.id).await, 0);

    service
        .set_course_status(&course.id, CourseStatus::Draft)
        .await
        .unwrap();
    assert!(service.published_courses().await.unwrap().is_empty());

    service.delete_course(&course.id).await.unwrap();
    assert!(
        service.course(&course.id).await.unwrap_err().is_not_found()
    );
}
