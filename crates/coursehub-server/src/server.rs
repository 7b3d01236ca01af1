use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::catalog::CatalogService;
use crate::{config::AppConfig, handlers};

/// Shared per-request state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

pub struct CoursehubServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: AppState, cfg: &AppConfig) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // Courses
        .route(
            "/api/courses",
            get(handlers::list_courses).post(handlers::create_course),
        )
        .route("/api/courses/published", get(handlers::published_courses))
        .route("/api/courses/enrolled", get(handlers::enrolled_courses))
        .route(
            "/api/courses/{id}",
            get(handlers::get_course)
                .put(handlers::update_course)
                .delete(handlers::delete_course),
        )
        .route(
            "/api/courses/{id}/status",
            patch(handlers::update_course_status),
        )
        .route("/api/courses/{id}/views", get(handlers::course_views))
        .route("/api/courses/{id}/enroll", post(handlers::enroll))
        // Lessons
        .route(
            "/api/courses/{id}/lessons",
            get(handlers::course_lessons).post(handlers::create_lesson),
        )
        .route(
            "/api/courses/lessons/{lesson_id}",
            get(handlers::get_lesson)
                .put(handlers::update_lesson)
                .delete(handlers::delete_lesson),
        )
        // Videos
        .route(
            "/api/courses/lessons/{lesson_id}/videos",
            get(handlers::lesson_videos).post(handlers::create_video),
        )
        // Middleware stack
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    state: AppState,
}

impl ServerBuilder {
    pub fn new(state: AppState) -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            state,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> CoursehubServer {
        let app = build_app(self.state, &self.config);

        CoursehubServer {
            addr: self.addr,
            app,
        }
    }
}

impl CoursehubServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
