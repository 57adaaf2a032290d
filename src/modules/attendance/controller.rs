use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use registrar_auth::PrincipalType;
use registrar_core::{AppError, ErrorResponse};

use crate::middleware::auth::{AuthUser, RequireTeacher};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{Attendance, RecordAttendanceDto};
use super::service::AttendanceService;

#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = RecordAttendanceDto,
    responses(
        (status = 201, description = "Attendance recorded", body = Attendance),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the course's instructor", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn record_attendance(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
    ValidatedJson(dto): ValidatedJson<RecordAttendanceDto>,
) -> Result<(StatusCode, Json<Attendance>), AppError> {
    let teacher_id = teacher.principal_id()?;
    let attendance = AttendanceService::record_attendance(&state.db, teacher_id, dto).await?;
    Ok((StatusCode::CREATED, Json(attendance)))
}

#[utoipa::path(
    get,
    path = "/api/attendance/student/{student_id}",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "The student's attendance, newest first", body = Vec<Attendance>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not this student and not a teacher", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    if !auth_user.is_teacher() && !auth_user.is_principal(PrincipalType::Student, student_id) {
        return Err(AppError::forbidden(anyhow!(
            "You can only view your own attendance"
        )));
    }

    let records = AttendanceService::get_student_attendance(&state.db, student_id).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/attendance/course/{course_id}",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Attendance for the course, newest first", body = Vec<Attendance>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher account required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_course_attendance(
    State(state): State<AppState>,
    _teacher: RequireTeacher,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    let records = AttendanceService::get_course_attendance(&state.db, course_id).await?;
    Ok(Json(records))
}
