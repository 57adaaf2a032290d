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

use super::model::{
    CreateDepartmentDto, DepartmentResponse, DepartmentWithMembers, UpdateDepartmentDto,
};
use super::service::DepartmentService;

#[utoipa::path(
    post,
    path = "/api/department",
    request_body = CreateDepartmentDto,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 400, description = "Invalid input or department already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher account required", body = ErrorResponse),
        (status = 404, description = "Head of department teacher not found", body = ErrorResponse)
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_department(
    State(state): State<AppState>,
    RequireTeacher(_teacher): RequireTeacher,
    ValidatedJson(dto): ValidatedJson<CreateDepartmentDto>,
) -> Result<(StatusCode, Json<DepartmentResponse>), AppError> {
    let department = DepartmentService::create_department(&state.db, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(DepartmentResponse {
            message: "Department created successfully".to_string(),
            department,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/department",
    responses(
        (status = 200, description = "Departments with their courses and teachers", body = Vec<DepartmentWithMembers>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_departments(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<DepartmentWithMembers>>, AppError> {
    let departments = DepartmentService::get_departments(&state.db).await?;
    Ok(Json(departments))
}

#[utoipa::path(
    get,
    path = "/api/department/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department details", body = DepartmentWithMembers),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Department not found", body = ErrorResponse)
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_department(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DepartmentWithMembers>, AppError> {
    let department = DepartmentService::get_department_by_id(&state.db, id).await?;
    Ok(Json(department))
}

#[utoipa::path(
    put,
    path = "/api/department/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    request_body = UpdateDepartmentDto,
    responses(
        (status = 200, description = "Department updated", body = DepartmentResponse),
        (status = 400, description = "Invalid input or name already taken", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher account required", body = ErrorResponse),
        (status = 404, description = "Department not found", body = ErrorResponse)
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_department(
    State(state): State<AppState>,
    RequireTeacher(_teacher): RequireTeacher,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateDepartmentDto>,
) -> Result<Json<DepartmentResponse>, AppError> {
    let department = DepartmentService::update_department(&state.db, id, dto).await?;

    Ok(Json(DepartmentResponse {
        message: "Department updated successfully".to_string(),
        department,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/department/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deleted", body = MessageResponse),
        (status = 400, description = "Department still has courses or teachers", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher account required", body = ErrorResponse),
        (status = 404, description = "Department not found", body = ErrorResponse)
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_department(
    State(state): State<AppState>,
    RequireTeacher(_teacher): RequireTeacher,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    DepartmentService::delete_department(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Department deleted successfully")))
}
