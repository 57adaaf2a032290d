use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;
use uuid::Uuid;

use registrar_auth::PrincipalType;
use registrar_core::{AppError, ErrorResponse, MessageResponse};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{Student, UpdateStudentDto};
use super::service::StudentService;

/// A student may manage their own record; teachers may manage any.
fn ensure_can_manage_student(auth_user: &AuthUser, student_id: Uuid) -> Result<(), AppError> {
    if auth_user.is_teacher() || auth_user.is_principal(PrincipalType::Student, student_id) {
        return Ok(());
    }
    Err(AppError::forbidden(anyhow!(
        "You can only modify your own student record"
    )))
}

#[utoipa::path(
    get,
    path = "/api/student",
    responses(
        (status = 200, description = "All students", body = Vec<Student>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<Student>>, AppError> {
    let students = StudentService::get_students(&state.db).await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/student/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::get_student_by_id(&state.db, id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/student/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Invalid input or duplicate username/email", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not this student and not a teacher, or a student changing status", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    ensure_can_manage_student(&auth_user, id)?;
    if auth_user.is_student() && dto.touches_registry_fields() {
        return Err(AppError::forbidden(anyhow!(
            "Only teachers can change a student's status or enrollment date"
        )));
    }
    let student = StudentService::update_student(&state.db, id, dto).await?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/student/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not this student and not a teacher", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_can_manage_student(&auth_user, id)?;
    StudentService::delete_student(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Student deleted successfully")))
}
