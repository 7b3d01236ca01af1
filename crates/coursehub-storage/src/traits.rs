//! Storage trait for the catalog storage abstraction layer.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use coursehub_core::{Course, CourseStatus, Lesson, Video};

/// The storage trait that all catalog backends must implement.
///
/// Implementations must be thread-safe (`Send + Sync`); the service layer
/// shares one backend process-wide as an `Arc<dyn CatalogStorage>`.
///
/// Reads of a missing record return `Ok(None)`; errors are reserved for
/// infrastructure failures. Mutations of a missing record return
/// [`StorageError::NotFound`].
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    // ==================== Courses ====================

    /// Inserts a new course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a course with the same id exists.
    async fn insert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Reads a course by id. Returns `None` if it does not exist.
    async fn get_course(&self, id: &Uuid) -> Result<Option<Course>, StorageError>;

    /// Replaces an existing course wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course does not exist.
    async fn update_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Deletes a course and everything nested under it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course does not exist.
    async fn delete_course(&self, id: &Uuid) -> Result<(), StorageError>;

    /// Lists courses in the given publication status, oldest first.
    async fn courses_by_status(&self, status: CourseStatus) -> Result<Vec<Course>, StorageError>;

    /// Lists courses owned by the given instructor, oldest first.
    async fn courses_by_instructor(
        &self,
        instructor_id: &str,
    ) -> Result<Vec<Course>, StorageError>;

    /// Lists courses the given student is enrolled in, oldest first.
    async fn courses_enrolling(&self, student_id: &str) -> Result<Vec<Course>, StorageError>;

    // ==================== Lessons ====================

    /// Inserts a new lesson.
    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// Reads a lesson by id. Returns `None` if it does not exist.
    async fn get_lesson(&self, id: &Uuid) -> Result<Option<Lesson>, StorageError>;

    /// Replaces an existing lesson wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the lesson does not exist.
    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// Deletes a lesson and its videos.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the lesson does not exist.
    async fn delete_lesson(&self, id: &Uuid) -> Result<(), StorageError>;

    /// Lists the lessons of a course ordered by `order_number`.
    async fn lessons_by_course(&self, course_id: &Uuid) -> Result<Vec<Lesson>, StorageError>;

    // ==================== Videos ====================

    /// Inserts new video metadata.
    async fn insert_video(&self, video: &Video) -> Result<(), StorageError>;

    /// Lists the videos of a lesson ordered by `order_number`.
    async fn videos_by_lesson(&self, lesson_id: &Uuid) -> Result<Vec<Video>, StorageError>;

    // ==================== Metadata ====================

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that CatalogStorage is object-safe
    fn _assert_storage_object_safe(_: &dyn CatalogStorage) {}
}
