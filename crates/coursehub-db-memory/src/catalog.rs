//! In-memory catalog storage backed by `DashMap`.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use coursehub_core::{Course, CourseStatus, Lesson, Video};
use coursehub_storage::{CatalogStorage, StorageError};

/// In-memory catalog storage.
///
/// All maps are keyed by record id; listings are sorted on the way out, so
/// iteration order of the underlying maps never leaks into results.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    courses: Arc<DashMap<Uuid, Course>>,
    lessons: Arc<DashMap<Uuid, Lesson>>,
    videos: Arc<DashMap<Uuid, Video>>,
}

impl MemoryCatalog {
    /// Creates an empty in-memory catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_courses(&self, mut matching: Vec<Course>) -> Vec<Course> {
        matching.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        matching
    }
}

#[async_trait]
impl CatalogStorage for MemoryCatalog {
    async fn insert_course(&self, course: &Course) -> Result<(), StorageError> {
        match self.courses.entry(course.id) {
            Entry::Occupied(_) => Err(StorageError::already_exists(
                "course",
                course.id.to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(course.clone());
                Ok(())
            }
        }
    }

    async fn get_course(&self, id: &Uuid) -> Result<Option<Course>, StorageError> {
        Ok(self.courses.get(id).map(|c| c.value().clone()))
    }

    async fn update_course(&self, course: &Course) -> Result<(), StorageError> {
        match self.courses.entry(course.id) {
            Entry::Occupied(mut slot) => {
                slot.insert(course.clone());
                Ok(())
            }
            Entry::Vacant(_) => Err(StorageError::not_found("course", course.id.to_string())),
        }
    }

    async fn delete_course(&self, id: &Uuid) -> Result<(), StorageError> {
        if self.courses.remove(id).is_none() {
            return Err(StorageError::not_found("course", id.to_string()));
        }
        // Cascade to lessons and their videos.
        let lesson_ids: HashSet<Uuid> = self
            .lessons
            .iter()
            .filter(|l| l.course_id == *id)
            .map(|l| l.id)
            .collect();
        self.lessons.retain(|_, l| l.course_id != *id);
        self.videos.retain(|_, v| !lesson_ids.contains(&v.lesson_id));
        Ok(())
    }

    async fn courses_by_status(&self, status: CourseStatus) -> Result<Vec<Course>, StorageError> {
        let matching = self
            .courses
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.value().clone())
            .collect();
        Ok(self.sorted_courses(matching))
    }

    async fn courses_by_instructor(
        &self,
        instructor_id: &str,
    ) -> Result<Vec<Course>, StorageError> {
        let matching = self
            .courses
            .iter()
            .filter(|c| c.instructor_id == instructor_id)
            .map(|c| c.value().clone())
            .collect();
        Ok(self.sorted_courses(matching))
    }

    async fn courses_enrolling(&self, student_id: &str) -> Result<Vec<Course>, StorageError> {
        let matching = self
            .courses
            .iter()
            .filter(|c| c.enrolled_students.iter().any(|s| s == student_id))
            .map(|c| c.value().clone())
            .collect();
        Ok(self.sorted_courses(matching))
    }

    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        match self.lessons.entry(lesson.id) {
            Entry::Occupied(_) => Err(StorageError::already_exists(
                "lesson",
                lesson.id.to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(lesson.clone());
                Ok(())
            }
        }
    }

    async fn get_lesson(&self, id: &Uuid) -> Result<Option<Lesson>, StorageError> {
        Ok(self.lessons.get(id).map(|l| l.value().clone()))
    }

    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        match self.lessons.entry(lesson.id) {
            Entry::Occupied(mut slot) => {
                slot.insert(lesson.clone());
                Ok(())
            }
            Entry::Vacant(_) => Err(StorageError::not_found("lesson", lesson.id.to_string())),
        }
    }

    async fn delete_lesson(&self, id: &Uuid) -> Result<(), StorageError> {
        if self.lessons.remove(id).is_none() {
            return Err(StorageError::not_found("lesson", id.to_string()));
        }
        self.videos.retain(|_, v| v.lesson_id != *id);
        Ok(())
    }

    async fn lessons_by_course(&self, course_id: &Uuid) -> Result<Vec<Lesson>, StorageError> {
        let mut matching: Vec<Lesson> = self
            .lessons
            .iter()
            .filter(|l| l.course_id == *course_id)
            .map(|l| l.value().clone())
            .collect();
        matching.sort_by(|a, b| {
            (a.order_number, a.created_at, a.id).cmp(&(b.order_number, b.created_at, b.id))
        });
        Ok(matching)
    }

    async fn insert_video(&self, video: &Video) -> Result<(), StorageError> {
        match self.videos.entry(video.id) {
            Entry::Occupied(_) => {
                Err(StorageError::already_exists("video", video.id.to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(video.clone());
                Ok(())
            }
        }
    }

    async fn videos_by_lesson(&self, lesson_id: &Uuid) -> Result<Vec<Video>, StorageError> {
        let mut matching: Vec<Video> = self
            .videos
            .iter()
            .filter(|v| v.lesson_id == *lesson_id)
            .map(|v| v.value().clone())
            .collect();
        matching.sort_by(|a, b| {
            (a.order_number, a.created_at, a.id).cmp(&(b.order_number, b.created_at, b.id))
        });
        Ok(matching)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
