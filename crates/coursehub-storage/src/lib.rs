//! # coursehub-storage
//!
//! Storage abstraction layer for the Coursehub catalog service.
//!
//! This crate defines the trait and error types that all catalog storage
//! backends must implement. It does not contain any implementations - those
//! are provided by separate crates (e.g. `coursehub-db-memory`).
//!
//! ## Example
//!
//! ```ignore
//! use coursehub_core::CourseStatus;
//! use coursehub_storage::{CatalogStorage, StorageError};
//!
//! async fn published(storage: &dyn CatalogStorage) -> Result<usize, StorageError> {
//!     let courses = storage.courses_by_status(CourseStatus::Published).await?;
//!     Ok(courses.len())
//! }
//! ```

mod error;
mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::CatalogStorage;

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared storage trait object.
pub type DynStorage = std::sync::Arc<dyn CatalogStorage>;
