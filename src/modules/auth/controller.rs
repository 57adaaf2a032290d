use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use registrar_auth::PrincipalType;
use registrar_core::{AppError, ErrorResponse, MessageResponse};

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{LoginRequest, LoginResponse, RegisterRequest};
use super::service::AuthService;

async fn register(
    state: &AppState,
    principal_type: PrincipalType,
    dto: RegisterRequest,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    AuthService::register(&state.db, principal_type, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "{} registered successfully",
            principal_type.label()
        ))),
    ))
}

/// Register a student account
#[utoipa::path(
    post,
    path = "/api/student/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Student registered", body = MessageResponse),
        (status = 400, description = "Validation error, password mismatch, or duplicate username/email", body = ErrorResponse),
        (status = 429, description = "Too many requests")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    register(&state, PrincipalType::Student, dto).await
}

/// Log in as a student
#[utoipa::path(
    post,
    path = "/api/student/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 429, description = "Too many requests")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response =
        AuthService::login(&state.db, PrincipalType::Student, dto, &state.jwt_config).await?;
    Ok(Json(response))
}

/// Register a teacher account
#[utoipa::path(
    post,
    path = "/api/teacher/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Teacher registered", body = MessageResponse),
        (status = 400, description = "Validation error, password mismatch, or duplicate username/email", body = ErrorResponse),
        (status = 429, description = "Too many requests")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_teacher(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    register(&state, PrincipalType::Teacher, dto).await
}

/// Log in as a teacher
#[utoipa::path(
    post,
    path = "/api/teacher/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 429, description = "Too many requests")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_teacher(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response =
        AuthService::login(&state.db, PrincipalType::Teacher, dto, &state.jwt_config).await?;
    Ok(Json(response))
}
