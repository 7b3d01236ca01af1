use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use coursehub_core::{Course, CourseStatus, Lesson, Video};

use crate::catalog::{
    CatalogError, CourseUpdate, LessonUpdate, NewCourse, NewLesson, VideoMetadata,
};
use crate::server::AppState;

/// Catalog error wrapper carrying the HTTP mapping.
pub struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_not_found() {
            StatusCode::NOT_FOUND
        } else if matches!(self.0, CatalogError::Invalid { .. }) {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self.0, "catalog operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "Coursehub Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

// ---- Courses ----

#[derive(Debug, Default, Deserialize)]
pub struct CourseListQuery {
    pub instructor_id: Option<String>,
}

pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = match query.instructor_id {
        Some(instructor_id) => state.catalog.courses_by_instructor(&instructor_id).await?,
        None => state.catalog.published_courses().await?,
    };
    Ok(Json(courses))
}

#[derive(Debug, Deserialize)]
pub struct EnrolledQuery {
    pub student_id: String,
}

pub async fn enrolled_courses(
    State(state): State<AppState>,
    Query(query): Query<EnrolledQuery>,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.catalog.enrolled_courses(&query.student_id).await?))
}

pub async fn published_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.catalog.published_courses().await?))
}

pub async fn create_course(
    State(state): State<AppState>,
    Json(body): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let course = state.catalog.create_course(body).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, ApiError> {
    Ok(Json(state.catalog.course(&id).await?))
}

pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CourseUpdate>,
) -> Result<Json<Course>, ApiError> {
    Ok(Json(state.catalog.update_course(&id, body).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

pub async fn update_course_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<Course>, ApiError> {
    let status: CourseStatus = body
        .status
        .parse()
        .map_err(|e: coursehub_core::CoreError| {
            ApiError(CatalogError::Invalid {
                message: e.to_string(),
            })
        })?;
    Ok(Json(state.catalog.set_course_status(&id, status).await?))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_course(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn course_views(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<i64> {
    Json(state.catalog.course_views(&id).await)
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub student_id: String,
}

pub async fn enroll(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(body): Json<EnrollRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .catalog
        .enroll_student(&course_id, &body.student_id)
        .await?;
    Ok(StatusCode::OK)
}

// ---- Lessons ----

pub async fn create_lesson(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(body): Json<NewLesson>,
) -> Result<(StatusCode, Json<Lesson>), ApiError> {
    let lesson = state.catalog.create_lesson(&course_id, body).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn course_lessons(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Lesson>>, ApiError> {
    Ok(Json(state.catalog.lessons_for_course(&course_id).await?))
}

pub async fn get_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<Lesson>, ApiError> {
    Ok(Json(state.catalog.lesson(&lesson_id).await?))
}

pub async fn update_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(body): Json<LessonUpdate>,
) -> Result<Json<Lesson>, ApiError> {
    Ok(Json(state.catalog.update_lesson(&lesson_id, body).await?))
}

pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_lesson(&lesson_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Videos ----

pub async fn create_video(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(body): Json<VideoMetadata>,
) -> Result<(StatusCode, Json<Video>), ApiError> {
    let video = state.catalog.create_video(&lesson_id, body).await?;
    Ok((StatusCode::CREATED, Json(video)))
}

pub async fn lesson_videos(
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<Vec<Video>>, ApiError> {
    Ok(Json(state.catalog.videos_for_lesson(&lesson_id).await?))
}
