//! View-counter tests: increment atomicity under concurrency and the
//! rolling-window lifetime policy.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use coursehub_server::cache::{CacheBackend, CacheClient, ViewCounters};

fn counters(window: Duration) -> ViewCounters {
    ViewCounters::new(CacheClient::new(CacheBackend::new_memory()), window)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bumps_lose_no_updates() {
    const BUMPS: usize = 100;

    let counters = Arc::new(counters(Duration::from_secs(60)));
    let course_id = Uuid::new_v4();

    let mut handles = Vec::with_capacity(BUMPS);
    for _ in 0..BUMPS {
        let counters = Arc::clone(&counters);
        handles.push(tokio::spawn(async move { counters.bump(&course_id).await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_some());
    }

    assert_eq!(counters.read(&course_id).await, BUMPS as i64);
}

#[tokio::test]
async fn test_counter_expires_after_idle_window() {
    let counters = counters(Duration::from_millis(50));
    let course_id = Uuid::new_v4();

    counters.bump(&course_id).await;
    assert_eq!(counters.read(&course_id).await, 1);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(counters.read(&course_id).await, 0);
}

#[tokio::test]
async fn test_bump_refreshes_window() {
    let counters = counters(Duration::from_millis(100));
    let course_id = Uuid::new_v4();

    counters.bump(&course_id).await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    // Activity inside the window keeps the counter alive past the original
    // deadline.
    counters.bump(&course_id).await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(counters.read(&course_id).await, 2);
}
