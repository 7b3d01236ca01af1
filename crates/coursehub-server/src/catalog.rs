//! Catalog orchestration: store CRUD plus cache coordination.
//!
//! Every write follows the same ordering: the store mutation commits first,
//! cache invalidation runs after. Invalidating before commit would let a
//! concurrent reader repopulate the snapshot with pre-mutation data that
//! outlives the invalidation. The window between commit and invalidation
//! still exists; a reader can cache stale data there, bounded by the
//! snapshot TTL.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use coursehub_core::{Course, CourseStatus, Lesson, Video, VideoStatus};
use coursehub_storage::{DynStorage, StorageError};

use crate::cache::{PublishedCoursesCache, ViewCounters};
use crate::notifications::{NewLessonNotice, NoticeDispatcher};

/// Errors surfaced by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid input: {message}")]
    Invalid { message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CatalogError {
    fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Returns `true` if the error denotes a missing record (404).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Storage(err) => err.is_not_found(),
            Self::Invalid { .. } => false,
        }
    }
}

fn default_course_status() -> CourseStatus {
    CourseStatus::Draft
}

/// Request body for creating a course.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub instructor_id: String,
    #[serde(default = "default_course_status")]
    pub status: CourseStatus,
}

/// Request body for replacing the editable fields of a course.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseUpdate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub status: CourseStatus,
}

/// Request body for creating a lesson.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLesson {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub order_number: i32,
}

/// Request body for replacing the editable fields of a lesson.
#[derive(Debug, Clone, Deserialize)]
pub struct LessonUpdate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub order_number: i32,
}

/// Request body for registering video metadata on a lesson.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub video_url: String,
    pub object_name: String,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub order_number: Option<i32>,
}

/// The catalog service: store reads/writes with cache coordination at the
/// defined extension points. Stateless apart from its injected handles.
pub struct CatalogService {
    storage: DynStorage,
    cache: PublishedCoursesCache,
    views: ViewCounters,
    notifier: Arc<dyn NoticeDispatcher>,
}

impl CatalogService {
    /// Wire a catalog service from its collaborators.
    pub fn new(
        storage: DynStorage,
        cache: PublishedCoursesCache,
        views: ViewCounters,
        notifier: Arc<dyn NoticeDispatcher>,
    ) -> Self {
        Self {
            storage,
            cache,
            views,
            notifier,
        }
    }

    // ==================== Courses ====================

    /// Create a course. Always invalidates the published snapshot: without a
    /// prior value to diff against, membership of the new course cannot be
    /// ruled out, so a few unnecessary misses beat a stale listing.
    pub async fn create_course(&self, new: NewCourse) -> Result<Course, CatalogError> {
        if new.title.trim().is_empty() {
            return Err(CatalogError::invalid("title must not be empty"));
        }
        let course = Course::new(
            new.title,
            new.description,
            new.image_url,
            new.instructor_id,
            new.status,
        );
        tracing::info!(course_id = %course.id, instructor_id = %course.instructor_id, "creating course");
        self.storage.insert_course(&course).await?;

        self.cache.invalidate().await;

        Ok(course)
    }

    /// Read a course and record one view (best-effort).
    pub async fn course(&self, id: &Uuid) -> Result<Course, CatalogError> {
        let course = self.fetch_course(id).await?;
        let _ = self.views.bump(id).await;
        Ok(course)
    }

    /// List published courses through the cache-aside path: snapshot hit
    /// serves directly, miss falls through to the store and repopulates.
    pub async fn published_courses(&self) -> Result<Vec<Course>, CatalogError> {
        if let Some(courses) = self.cache.get_cached().await {
            return Ok(courses);
        }

        let courses = self
            .storage
            .courses_by_status(CourseStatus::Published)
            .await?;
        self.cache.populate(&courses).await;
        Ok(courses)
    }

    /// List the courses owned by an instructor. Uncached.
    pub async fn courses_by_instructor(
        &self,
        instructor_id: &str,
    ) -> Result<Vec<Course>, CatalogError> {
        Ok(self.storage.courses_by_instructor(instructor_id).await?)
    }

    /// List the courses a student is enrolled in. Uncached.
    pub async fn enrolled_courses(&self, student_id: &str) -> Result<Vec<Course>, CatalogError> {
        Ok(self.storage.courses_enrolling(student_id).await?)
    }

    /// Replace the editable fields of a course.
    ///
    /// The snapshot is invalidated only when the update moves the course
    /// into or out of the published set; a field edit on a still-published
    /// course stays stale in cache until the TTL turns it over.
    pub async fn update_course(
        &self,
        id: &Uuid,
        update: CourseUpdate,
    ) -> Result<Course, CatalogError> {
        let existing = self.fetch_course(id).await?;
        let old_status = existing.status;

        let mut course = existing;
        course.title = update.title;
        course.description = update.description;
        course.image_url = update.image_url;
        course.status = update.status;
        course.touch();

        // Commit before any invalidation.
        self.storage.update_course(&course).await?;

        self.cache.on_status_change(old_status, course.status).await;
        self.cache.invalidate_course(id).await;

        Ok(course)
    }

    /// Transition a course's publication status.
    pub async fn set_course_status(
        &self,
        id: &Uuid,
        status: CourseStatus,
    ) -> Result<Course, CatalogError> {
        let existing = self.fetch_course(id).await?;
        let update = CourseUpdate {
            title: existing.title.clone(),
            description: existing.description.clone(),
            image_url: existing.image_url.clone(),
            status,
        };
        self.update_course(id, update).await
    }

    /// Delete a course (and, through the store, its lessons and videos).
    pub async fn delete_course(&self, id: &Uuid) -> Result<(), CatalogError> {
        let course = self.fetch_course(id).await?;
        self.storage.delete_course(id).await?;

        self.cache.on_deleted(&course).await;
        tracing::info!(course_id = %id, "deleted course");
        Ok(())
    }

    /// Approximate view count for a course.
    pub async fn course_views(&self, id: &Uuid) -> i64 {
        self.views.read(id).await
    }

    /// Enroll a student. Idempotent; enrollment does not affect the
    /// published predicate, so the cache is untouched.
    pub async fn enroll_student(
        &self,
        course_id: &Uuid,
        student_id: &str,
    ) -> Result<(), CatalogError> {
        let mut course = self.fetch_course(course_id).await?;
        if course.enrolled_students.iter().any(|s| s == student_id) {
            return Ok(());
        }
        course.enrolled_students.push(student_id.to_string());
        course.touch();
        self.storage.update_course(&course).await?;
        tracing::info!(course_id = %course_id, student_id = %student_id, "student enrolled");
        Ok(())
    }

    // ==================== Lessons ====================

    /// Add a lesson to a course and notify enrolled students (best-effort).
    pub async fn create_lesson(
        &self,
        course_id: &Uuid,
        new: NewLesson,
    ) -> Result<Lesson, CatalogError> {
        let course = self.fetch_course(course_id).await?;
        let lesson = Lesson::new(
            course.id,
            new.title,
            new.description,
            new.content,
            new.order_number,
        );
        tracing::info!(lesson_id = %lesson.id, course_id = %course.id, "creating lesson");
        self.storage.insert_lesson(&lesson).await?;

        self.notify_new_lesson(&course, &lesson).await;
        Ok(lesson)
    }

    /// Read a lesson.
    pub async fn lesson(&self, id: &Uuid) -> Result<Lesson, CatalogError> {
        self.storage
            .get_lesson(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("lesson", *id))
    }

    /// Replace the editable fields of a lesson.
    pub async fn update_lesson(
        &self,
        id: &Uuid,
        update: LessonUpdate,
    ) -> Result<Lesson, CatalogError> {
        let mut lesson = self.lesson(id).await?;
        lesson.title = update.title;
        lesson.description = update.description;
        lesson.content = update.content;
        lesson.order_number = update.order_number;
        lesson.touch();
        self.storage.update_lesson(&lesson).await?;
        Ok(lesson)
    }

    /// Delete a lesson (and, through the store, its videos).
    pub async fn delete_lesson(&self, id: &Uuid) -> Result<(), CatalogError> {
        let lesson = self.lesson(id).await?;
        self.storage.delete_lesson(id).await?;
        tracing::info!(lesson_id = %id, course_id = %lesson.course_id, "deleted lesson");
        Ok(())
    }

    /// List the lessons of a course in order.
    pub async fn lessons_for_course(&self, course_id: &Uuid) -> Result<Vec<Lesson>, CatalogError> {
        Ok(self.storage.lessons_by_course(course_id).await?)
    }

    // ==================== Videos ====================

    /// Register video metadata on a lesson. An unset or zero order number is
    /// assigned the next free slot.
    pub async fn create_video(
        &self,
        lesson_id: &Uuid,
        meta: VideoMetadata,
    ) -> Result<Video, CatalogError> {
        let lesson = self.lesson(lesson_id).await?;

        let mut order_number = meta.order_number.unwrap_or(0);
        if order_number == 0 {
            let existing = self.storage.videos_by_lesson(&lesson.id).await?;
            order_number = existing.last().map_or(1, |v| v.order_number + 1);
        }

        let video = Video::new(
            lesson.id,
            meta.title,
            meta.description,
            meta.video_url,
            meta.object_name,
            meta.file_size,
            meta.duration.unwrap_or(0),
            order_number,
            VideoStatus::Ready,
        );
        self.storage.insert_video(&video).await?;
        Ok(video)
    }

    /// List the videos of a lesson in order.
    pub async fn videos_for_lesson(&self, lesson_id: &Uuid) -> Result<Vec<Video>, CatalogError> {
        Ok(self.storage.videos_by_lesson(lesson_id).await?)
    }

    // ==================== Internals ====================

    /// Course read without the view bump (write paths, enrollments).
    async fn fetch_course(&self, id: &Uuid) -> Result<Course, CatalogError> {
        self.storage
            .get_course(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("course", *id))
    }

    async fn notify_new_lesson(&self, course: &Course, lesson: &Lesson) {
        if course.enrolled_students.is_empty() {
            return;
        }
        let message = format!(
            "New lesson added to course \"{}\": {}",
            course.title, lesson.title
        );
        for student in &course.enrolled_students {
            let notice = NewLessonNotice {
                user_id: student.clone(),
                course_id: course.id,
                lesson_id: lesson.id,
                message: message.clone(),
            };
            if let Err(e) = self.notifier.send(&notice).await {
                tracing::warn!(user_id = %student, error = %e, "failed to send new lesson notice");
            }
        }
        tracing::info!(
            course_id = %course.id,
            students = course.enrolled_students.len(),
            "sent new lesson notices"
        );
    }
}
