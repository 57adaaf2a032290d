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

use super::model::{Teacher, UpdateTeacherDto};
use super::service::TeacherService;

fn ensure_self(auth_user: &AuthUser, teacher_id: Uuid) -> Result<(), AppError> {
    if auth_user.is_principal(PrincipalType::Teacher, teacher_id) {
        return Ok(());
    }
    Err(AppError::forbidden(anyhow!(
        "You can only modify your own teacher record"
    )))
}

#[utoipa::path(
    get,
    path = "/api/teacher",
    responses(
        (status = 200, description = "All teachers", body = Vec<Teacher>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teachers(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<Teacher>>, AppError> {
    let teachers = TeacherService::get_teachers(&state.db).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/teacher/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher details", body = Teacher),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::get_teacher_by_id(&state.db, id).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    put,
    path = "/api/teacher/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated", body = Teacher),
        (status = 400, description = "Invalid input or duplicate username/email", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not this teacher", body = ErrorResponse),
        (status = 404, description = "Teacher or department not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<Teacher>, AppError> {
    ensure_self(&auth_user, id)?;
    let teacher = TeacherService::update_teacher(&state.db, id, dto).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    delete,
    path = "/api/teacher/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not this teacher", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_self(&auth_user, id)?;
    TeacherService::delete_teacher(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Teacher deleted successfully")))
}
