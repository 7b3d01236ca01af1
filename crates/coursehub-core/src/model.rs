//! Catalog domain model: courses, lessons and videos.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::CoreError;

/// Publication status of a course.
///
/// Only `Published` courses are visible to students; `Draft` and `Archived`
/// courses are visible to their instructor only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

impl CourseStatus {
    /// Returns `true` for the `Published` state.
    #[must_use]
    pub fn is_published(self) -> bool {
        matches!(self, Self::Published)
    }
}

impl FromStr for CourseStatus {
    type Err = CoreError;

    /// Parses a status name case-insensitively (`"published"` == `"PUBLISHED"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "PUBLISHED" => Ok(Self::Published),
            "ARCHIVED" => Ok(Self::Archived),
            other => Err(CoreError::invalid_status(other)),
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "DRAFT"),
            Self::Published => write!(f, "PUBLISHED"),
            Self::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// A course as stored in the catalog.
///
/// Unknown fields are ignored on deserialization and optional fields default,
/// so cached payloads written by older or newer builds still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// External identity of the instructor (subject id of the auth provider).
    pub instructor_id: String,
    pub status: CourseStatus,
    /// External identities of enrolled students.
    #[serde(default)]
    pub enrolled_students: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Course {
    /// Creates a new course with a fresh id and current timestamps.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        image_url: Option<String>,
        instructor_id: impl Into<String>,
        status: CourseStatus,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            image_url,
            instructor_id: instructor_id.into(),
            status,
            enrolled_students: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }

    /// Returns `true` if the course is visible in the published catalog.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status.is_published()
    }
}

/// A lesson within a course, ordered by `order_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub order_number: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Lesson {
    /// Creates a new lesson with a fresh id and current timestamps.
    #[must_use]
    pub fn new(
        course_id: Uuid,
        title: impl Into<String>,
        description: Option<String>,
        content: Option<String>,
        order_number: i32,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            course_id,
            title: title.into(),
            description,
            content,
            order_number,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }
}

/// Processing state of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoStatus {
    Processing,
    Ready,
    Failed,
}

/// Video metadata attached to a lesson. The binary itself lives in the
/// external object store; only `video_url`/`object_name` reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub video_url: String,
    pub object_name: String,
    #[serde(default)]
    pub file_size: Option<u64>,
    /// Duration in seconds; 0 when unknown.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub order_number: i32,
    pub status: VideoStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Video {
    /// Creates new video metadata with a fresh id and the current timestamp.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lesson_id: Uuid,
        title: impl Into<String>,
        description: Option<String>,
        video_url: impl Into<String>,
        object_name: impl Into<String>,
        file_size: Option<u64>,
        duration: u32,
        order_number: i32,
        status: VideoStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            lesson_id,
            title: title.into(),
            description,
            video_url: video_url.into(),
            object_name: object_name.into(),
            file_size,
            duration,
            order_number,
            status,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
