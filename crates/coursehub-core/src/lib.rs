//! Core domain types and errors shared across the Coursehub crates.

pub mod error;
pub mod model;

pub use error::{CoreError, ErrorCategory, Result};
pub use model::{Course, CourseStatus, Lesson, Video, VideoStatus};
