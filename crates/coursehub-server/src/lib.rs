//! Coursehub server: catalog HTTP API with a cache coordination tier.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod handlers;
pub mod notifications;
pub mod observability;
pub mod server;

pub use cache::{
    CacheBackend, CacheClient, CacheError, PublishedCoursesCache, ViewCounters, create_backend,
};
pub use catalog::{CatalogError, CatalogService};
pub use config::{AppConfig, CacheConfig, LoggingConfig, RedisConfig, ServerConfig};
pub use notifications::{LogDispatcher, NewLessonNotice, NoticeDispatcher};
pub use observability::{init_tracing, init_tracing_with_level};
pub use server::{AppState, CoursehubServer, ServerBuilder, build_app};
