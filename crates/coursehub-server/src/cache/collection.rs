//! Cache-aside coordination for the published-courses collection.
//!
//! One fixed key holds a JSON snapshot of all published courses; per-course
//! keys exist for invalidation only. The coordinator is stateless - it holds
//! no data beyond the key-value store itself and only translates write-side
//! events into key deletions.
//!
//! ## Cache keys
//!
//! - `courses:published` - the full snapshot, 5 min TTL by default
//! - `course:{id}` - per-course entry, deleted on mutation (not yet
//!   populated by any read path)
//!
//! ## Invalidation
//!
//! Over-invalidating is always safe; under-invalidating never is. Callers
//! must commit their store mutation before invoking any invalidation here,
//! otherwise a concurrent reader can repopulate the snapshot with
//! pre-mutation data that outlives the invalidation.

use std::time::Duration;

use uuid::Uuid;

use super::client::CacheClient;
use coursehub_core::{Course, CourseStatus};

const PUBLISHED_COURSES_KEY: &str = "courses:published";
const COURSE_KEY_PREFIX: &str = "course:";

/// Cache coordinator for the published-courses snapshot.
#[derive(Clone)]
pub struct PublishedCoursesCache {
    client: CacheClient,
    ttl: Duration,
}

impl PublishedCoursesCache {
    /// Create a coordinator over the given client with the given snapshot TTL.
    pub fn new(client: CacheClient, ttl: Duration) -> Self {
        Self { client, ttl }
    }

    fn course_key(id: &Uuid) -> String {
        format!("{COURSE_KEY_PREFIX}{id}")
    }

    /// Fetch the cached snapshot, if present.
    ///
    /// A payload that no longer decodes is treated as a miss: the entry is
    /// dropped so the next populate rewrites it in the current format.
    pub async fn get_cached(&self) -> Option<Vec<Course>> {
        let raw = self.client.get(PUBLISHED_COURSES_KEY).await?;
        match serde_json::from_str::<Vec<Course>>(&raw) {
            Ok(courses) => {
                tracing::debug!(count = courses.len(), "retrieved published courses from cache");
                Some(courses)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to deserialize cached courses, dropping entry");
                self.client.delete(PUBLISHED_COURSES_KEY).await;
                None
            }
        }
    }

    /// Cache the full published-courses snapshot, replacing any prior value.
    pub async fn populate(&self, courses: &[Course]) {
        match serde_json::to_string(courses) {
            Ok(json) => {
                self.client.set(PUBLISHED_COURSES_KEY, &json, self.ttl).await;
                tracing::debug!(count = courses.len(), "cached published courses");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize courses for cache");
            }
        }
    }

    /// Drop the collection snapshot. Idempotent.
    pub async fn invalidate(&self) {
        self.client.delete(PUBLISHED_COURSES_KEY).await;
        tracing::debug!("invalidated published courses cache");
    }

    /// Drop the per-course entry. No read path populates this key yet; the
    /// deletion keeps per-course caching safe to introduce later.
    pub async fn invalidate_course(&self, id: &Uuid) {
        self.client.delete(&Self::course_key(id)).await;
        tracing::debug!(course_id = %id, "invalidated course cache entry");
    }

    /// Invalidate the snapshot when a status change moves a course into or
    /// out of the published set.
    ///
    /// A transition that does not change membership (draft->draft,
    /// published->published) leaves the snapshot alone: other fields may
    /// have changed, but the entry stays within the TTL staleness budget.
    pub async fn on_status_change(&self, old: CourseStatus, new: CourseStatus) {
        let was_published = old.is_published();
        let is_published = new.is_published();
        if was_published != is_published {
            self.invalidate().await;
        }
    }

    /// Invalidate after a course deletion: the snapshot if the course was
    /// published, the per-course entry always.
    pub async fn on_deleted(&self, course: &Course) {
        if course.is_published() {
            self.invalidate().await;
        }
        self.invalidate_course(&course.id).await;
    }
}
