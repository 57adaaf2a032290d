use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use registrar_core::{AppError, ErrorResponse, MessageResponse};

use crate::middleware::auth::{AuthUser, RequireTeacher};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{Course, CreateCourseDto, UpdateCourseDto};
use super::service::CourseService;

#[utoipa::path(
    post,
    path = "/api/course",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid input or duplicate course code", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher account required", body = ErrorResponse),
        (status = 404, description = "Department or teacher not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_course(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let teacher_id = teacher.principal_id()?;
    let course = CourseService::create_course(&state.db, teacher_id, dto).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    get,
    path = "/api/course",
    responses(
        (status = 200, description = "All courses", body = Vec<Course>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_courses(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = CourseService::get_courses(&state.db).await?;
    Ok(Json(courses))
}

#[utoipa::path(
    get,
    path = "/api/course/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course details", body = Course),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::get_course_by_id(&state.db, id).await?;
    Ok(Json(course))
}

#[utoipa::path(
    put,
    path = "/api/course/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Invalid input or duplicate course code", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the course's instructor", body = ErrorResponse),
        (status = 404, description = "Course, department or teacher not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_course(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<Course>, AppError> {
    let teacher_id = teacher.principal_id()?;
    let course = CourseService::update_course(&state.db, id, teacher_id, dto).await?;
    Ok(Json(course))
}

#[utoipa::path(
    delete,
    path = "/api/course/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the course's instructor", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let teacher_id = teacher.principal_id()?;
    CourseService::delete_course(&state.db, id, teacher_id).await?;
    Ok(Json(MessageResponse::new("Course deleted successfully")))
}
