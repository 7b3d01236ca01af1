//! Best-effort notification dispatch to enrolled students.
//!
//! The catalog fans one notice out per enrolled student when a lesson is
//! added; delivery failures are logged and never surfaced to the write path.
//! The transport behind [`NoticeDispatcher`] (message queue, push service)
//! is an external concern - this crate ships only the logging dispatcher.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A new-lesson notice addressed to one student.
#[derive(Debug, Clone, Serialize)]
pub struct NewLessonNotice {
    pub user_id: String,
    pub course_id: Uuid,
    pub lesson_id: Uuid,
    pub message: String,
}

/// Adapter for delivering notices to students.
#[async_trait]
pub trait NoticeDispatcher: Send + Sync {
    /// Deliver a single notice.
    async fn send(&self, notice: &NewLessonNotice) -> Result<(), NotificationError>;
}

/// Dispatcher that only logs. Stands in wherever no transport is configured.
#[derive(Debug, Default)]
pub struct LogDispatcher;

#[async_trait]
impl NoticeDispatcher for LogDispatcher {
    async fn send(&self, notice: &NewLessonNotice) -> Result<(), NotificationError> {
        tracing::info!(
            user_id = %notice.user_id,
            course_id = %notice.course_id,
            lesson_id = %notice.lesson_id,
            "new lesson notice"
        );
        Ok(())
    }
}
