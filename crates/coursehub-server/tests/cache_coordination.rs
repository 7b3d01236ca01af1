//! Integration tests for the cache coordination tier, driven through the
//! catalog service: cache-aside reads, write-side invalidation, TTL expiry.
//!
//! The storage backend is wrapped with a query counter so the tests can
//! assert whether a read was served from the cache or fell through to the
//! store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use coursehub_core::{Course, CourseStatus, Lesson, Video};
use coursehub_db_memory::MemoryCatalog;
use coursehub_server::cache::{CacheBackend, CacheClient, PublishedCoursesCache, ViewCounters};
use coursehub_server::catalog::{CatalogService, CourseUpdate, NewCourse};
use coursehub_server::notifications::LogDispatcher;
use coursehub_storage::{CatalogStorage, StorageError};

/// Storage wrapper counting how often the published listing hits the store.
struct CountingStorage {
    inner: MemoryCatalog,
    status_queries: AtomicUsize,
}

impl CountingStorage {
    fn new() -> Self {
        Self {
            inner: MemoryCatalog::new(),
            status_queries: AtomicUsize::new(0),
        }
    }

    fn status_queries(&self) -> usize {
        self.status_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStorage for CountingStorage {
    async fn insert_course(&self, course: &Course) -> Result<(), StorageError> {
        self.inner.insert_course(course).await
    }

    async fn get_course(&self, id: &Uuid) -> Result<Option<Course>, StorageError> {
        self.inner.get_course(id).await
    }

    async fn update_course(&self, course: &Course) -> Result<(), StorageError> {
        self.inner.update_course(course).await
    }

    async fn delete_course(&self, id: &Uuid) -> Result<(), StorageError> {
        self.inner.delete_course(id).await
    }

    async fn courses_by_status(&self, status: CourseStatus) -> Result<Vec<Course>, StorageError> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.courses_by_status(status).await
    }

    async fn courses_by_instructor(
        &self,
        instructor_id: &str,
    ) -> Result<Vec<Course>, StorageError> {
        self.inner.courses_by_instructor(instructor_id).await
    }

    async fn courses_enrolling(&self, student_id: &str) -> Result<Vec<Course>, StorageError> {
        self.inner.courses_enrolling(student_id).await
    }

    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        self.inner.insert_lesson(lesson).await
    }

    async fn get_lesson(&self, id: &Uuid) -> Result<Option<Lesson>, StorageError> {
        self.inner.get_lesson(id).await
    }

    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        self.inner.update_lesson(lesson).await
    }

    async fn delete_lesson(&self, id: &Uuid) -> Result<(), StorageError> {
        self.inner.delete_lesson(id).await
    }

    async fn lessons_by_course(&self, course_id: &Uuid) -> Result<Vec<Lesson>, StorageError> {
        self.inner.lessons_by_course(course_id).await
    }

    async fn insert_video(&self, video: &Video) -> Result<(), StorageError> {
        self.inner.insert_video(video).await
    }

    async fn videos_by_lesson(&self, lesson_id: &Uuid) -> Result<Vec<Video>, StorageError> {
        self.inner.videos_by_lesson(lesson_id).await
    }

    fn backend_name(&self) -> &'static str {
        "memory-counting"
    }
}

fn service_with_ttl(ttl: Duration) -> (Arc<CountingStorage>, CatalogService) {
    let storage = Arc::new(CountingStorage::new());
    let client = CacheClient::new(CacheBackend::new_memory());
    let service = CatalogService::new(
        storage.clone(),
        PublishedCoursesCache::new(client.clone(), ttl),
        ViewCounters::new(client, Duration::from_secs(60)),
        Arc::new(LogDispatcher),
    );
    (storage, service)
}

fn service() -> (Arc<CountingStorage>, CatalogService) {
    service_with_ttl(Duration::from_secs(300))
}

fn new_course(title: &str, status: CourseStatus) -> NewCourse {
    NewCourse {
        title: title.into(),
        description: String::new(),
        image_url: None,
        instructor_id: "teacher-1".into(),
        status,
    }
}

#[tokio::test]
async fn test_published_listing_served_from_cache() {
    let (storage, service) = service();
    service
        .create_course(new_course("A", CourseStatus::Published))
        .await
        .unwrap();

    let first = service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 1);

    let second = service.published_courses().await.unwrap();
    // Snapshot hit: no further store access.
    assert_eq!(storage.status_queries(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_draft_courses_are_not_listed() {
    let (_, service) = service();
    service
        .create_course(new_course("Draft only", CourseStatus::Draft))
        .await
        .unwrap();
    assert!(service.published_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_invalidates_snapshot() {
    let (storage, service) = service();
    service
        .create_course(new_course("A", CourseStatus::Published))
        .await
        .unwrap();
    service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 1);

    // Any create drops the snapshot, so the next read sees the new course.
    service
        .create_course(new_course("B", CourseStatus::Published))
        .await
        .unwrap();
    let listed = service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 2);
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_unpublish_invalidates_snapshot() {
    // The end-to-end scenario: populate [A, B], unpublish B, expect [A].
    let (storage, service) = service();
    let a = service
        .create_course(new_course("A", CourseStatus::Published))
        .await
        .unwrap();
    let b = service
        .create_course(new_course("B", CourseStatus::Published))
        .await
        .unwrap();

    let listed = service.published_courses().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(storage.status_queries(), 1);
    service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 1);

    // Store commit happens inside set_course_status before invalidation.
    service
        .set_course_status(&b.id, CourseStatus::Draft)
        .await
        .unwrap();

    let listed = service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 2);
    assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![a.id]);
}

#[tokio::test]
async fn test_field_edit_of_published_course_stays_cached() {
    let (storage, service) = service();
    let a = service
        .create_course(new_course("Old title", CourseStatus::Published))
        .await
        .unwrap();
    service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 1);

    // Published -> published: membership unchanged, snapshot untouched.
    service
        .update_course(
            &a.id,
            CourseUpdate {
                title: "New title".into(),
                description: String::new(),
                image_url: None,
                status: CourseStatus::Published,
            },
        )
        .await
        .unwrap();

    let listed = service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 1);
    // The stale title is the accepted cost, bounded by the snapshot TTL.
    assert_eq!(listed[0].title, "Old title");
}

#[tokio::test]
async fn test_delete_published_course_invalidates() {
    let (storage, service) = service();
    let a = service
        .create_course(new_course("A", CourseStatus::Published))
        .await
        .unwrap();
    let b = service
        .create_course(new_course("B", CourseStatus::Published))
        .await
        .unwrap();
    service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 1);

    service.delete_course(&b.id).await.unwrap();

    let listed = service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 2);
    assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![a.id]);
}

#[tokio::test]
async fn test_snapshot_expires_without_invalidation() {
    let (storage, service) = service_with_ttl(Duration::from_millis(50));
    service
        .create_course(new_course("A", CourseStatus::Published))
        .await
        .unwrap();
    service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 1);

    tokio::time::sleep(Duration::from_millis(80)).await;

    service.published_courses().await.unwrap();
    assert_eq!(storage.status_queries(), 2);
}

#[tokio::test]
async fn test_concurrent_cold_reads_all_answer() {
    // No single-flight protection: concurrent misses may each hit the store,
    // but every reader gets a correct answer.
    let (storage, service) = service();
    let service = Arc::new(service);
    service
        .create_course(new_course("A", CourseStatus::Published))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(
            async move { service.published_courses().await },
        ));
    }
    for handle in handles {
        let listed = handle.await.unwrap().unwrap();
        assert_eq!(listed.len(), 1);
    }
    assert!(storage.status_queries() >= 1);
}
