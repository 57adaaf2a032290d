use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use registrar_auth::PrincipalType;
use registrar_core::{AppError, ErrorResponse, MessageResponse};

use crate::middleware::auth::{AuthUser, RequireTeacher};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{CreateEnrollmentDto, Enrollment, StudentEnrollment, UpdateEnrollmentDto};
use super::service::EnrollmentService;

fn ensure_can_view_student(auth_user: &AuthUser, student_id: Uuid) -> Result<(), AppError> {
    if auth_user.is_teacher() || auth_user.is_principal(PrincipalType::Student, student_id) {
        return Ok(());
    }
    Err(AppError::forbidden(anyhow!(
        "You can only view your own enrollments"
    )))
}

/// Resolves whom an enrollment is for: students enroll only themselves,
/// teachers must name the student.
fn resolve_enrollee(auth_user: &AuthUser, requested: Option<Uuid>) -> Result<Uuid, AppError> {
    let caller = auth_user.principal_id()?;

    match (auth_user.principal_type(), requested) {
        (PrincipalType::Student, None) => Ok(caller),
        (PrincipalType::Student, Some(id)) if id == caller => Ok(caller),
        (PrincipalType::Student, Some(_)) => Err(AppError::forbidden(anyhow!(
            "Students can only enroll themselves"
        ))),
        (PrincipalType::Teacher, Some(id)) => Ok(id),
        (PrincipalType::Teacher, None) => {
            Err(AppError::validation(anyhow!("studentId is required")))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/enrollment",
    request_body = CreateEnrollmentDto,
    responses(
        (status = 201, description = "Student enrolled", body = Enrollment),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Students can only enroll themselves", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_enrollment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateEnrollmentDto>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let student_id = resolve_enrollee(&auth_user, dto.student_id)?;
    let enrollment = EnrollmentService::create_enrollment(&state.db, student_id, dto).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Teachers see every enrollment; students see their own.
#[utoipa::path(
    get,
    path = "/api/enrollment",
    responses(
        (status = 200, description = "Enrollments visible to the caller", body = Vec<Enrollment>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_enrollments(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let filter = if auth_user.is_teacher() {
        None
    } else {
        Some(auth_user.principal_id()?)
    };
    let enrollments = EnrollmentService::get_enrollments(&state.db, filter).await?;
    Ok(Json(enrollments))
}

#[utoipa::path(
    get,
    path = "/api/enrollment/{student_id}",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "The student's enrollments with course details", body = Vec<StudentEnrollment>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not this student and not a teacher", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_enrollments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<StudentEnrollment>>, AppError> {
    ensure_can_view_student(&auth_user, student_id)?;
    let enrollments = EnrollmentService::get_student_enrollments(&state.db, student_id).await?;
    Ok(Json(enrollments))
}

#[utoipa::path(
    get,
    path = "/api/enrollment/entry/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment details", body = Enrollment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not this student's enrollment", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_enrollment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = EnrollmentService::get_enrollment_by_id(&state.db, id).await?;
    ensure_can_view_student(&auth_user, enrollment.student_id)?;
    Ok(Json(enrollment))
}

#[utoipa::path(
    put,
    path = "/api/enrollment/entry/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = UpdateEnrollmentDto,
    responses(
        (status = 200, description = "Enrollment updated", body = Enrollment),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher account required", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_enrollment(
    State(state): State<AppState>,
    _teacher: RequireTeacher,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateEnrollmentDto>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = EnrollmentService::update_enrollment(&state.db, id, dto).await?;
    Ok(Json(enrollment))
}

#[utoipa::path(
    delete,
    path = "/api/enrollment/entry/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher account required", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_enrollment(
    State(state): State<AppState>,
    _teacher: RequireTeacher,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    EnrollmentService::delete_enrollment(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Enrollment deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_auth::Claims;

    fn auth_user(principal_type: PrincipalType, id: Uuid) -> AuthUser {
        AuthUser(Claims {
            sub: id.to_string(),
            user_type: principal_type,
            exp: 0,
            iat: 0,
        })
    }

    #[test]
    fn test_student_enrolls_self_by_default() {
        let id = Uuid::new_v4();
        let student = auth_user(PrincipalType::Student, id);
        assert_eq!(resolve_enrollee(&student, None).unwrap(), id);
        assert_eq!(resolve_enrollee(&student, Some(id)).unwrap(), id);
    }

    #[test]
    fn test_student_cannot_enroll_someone_else() {
        let student = auth_user(PrincipalType::Student, Uuid::new_v4());
        let err = resolve_enrollee(&student, Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }

    #[test]
    fn test_teacher_must_name_student() {
        let teacher = auth_user(PrincipalType::Teacher, Uuid::new_v4());
        let err = resolve_enrollee(&teacher, None).unwrap_err();
        assert_eq!(err.status.as_u16(), 400);

        let student_id = Uuid::new_v4();
        assert_eq!(resolve_enrollee(&teacher, Some(student_id)).unwrap(), student_id);
    }

    #[test]
    fn test_enrollment_visibility() {
        let student_id = Uuid::new_v4();
        let owner = auth_user(PrincipalType::Student, student_id);
        let other = auth_user(PrincipalType::Student, Uuid::new_v4());
        let teacher = auth_user(PrincipalType::Teacher, Uuid::new_v4());

        assert!(ensure_can_view_student(&owner, student_id).is_ok());
        assert!(ensure_can_view_student(&teacher, student_id).is_ok());
        assert!(ensure_can_view_student(&other, student_id).is_err());
    }
}
