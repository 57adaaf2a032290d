use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use registrar_core::{AppError, ErrorResponse, MessageResponse};

use crate::middleware::auth::{AuthUser, RequireStudent, RequireTeacher};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{CourseRoom, CourseRoomWithCourse, CreateCourseRoomDto, UpdateCourseRoomDto};
use super::service::CourseRoomService;

#[utoipa::path(
    post,
    path = "/api/course-room",
    request_body = CreateCourseRoomDto,
    responses(
        (status = 201, description = "Course room created", body = CourseRoom),
        (status = 400, description = "Invalid input or the course already has a room", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the course's instructor", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Course Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_course_room(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
    ValidatedJson(dto): ValidatedJson<CreateCourseRoomDto>,
) -> Result<(StatusCode, Json<CourseRoom>), AppError> {
    let teacher_id = teacher.principal_id()?;
    let room = CourseRoomService::create_course_room(&state.db, teacher_id, dto).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

#[utoipa::path(
    get,
    path = "/api/course-room",
    responses(
        (status = 200, description = "All course rooms", body = Vec<CourseRoomWithCourse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Course Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_course_rooms(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<CourseRoomWithCourse>>, AppError> {
    let rooms = CourseRoomService::get_course_rooms(&state.db).await?;
    Ok(Json(rooms))
}

#[utoipa::path(
    get,
    path = "/api/course-room/teacher",
    responses(
        (status = 200, description = "Rooms owned by the calling teacher", body = Vec<CourseRoomWithCourse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher account required", body = ErrorResponse)
    ),
    tag = "Course Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teacher_rooms(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
) -> Result<Json<Vec<CourseRoomWithCourse>>, AppError> {
    let teacher_id = teacher.principal_id()?;
    let rooms = CourseRoomService::get_teacher_rooms(&state.db, teacher_id).await?;
    Ok(Json(rooms))
}

#[utoipa::path(
    get,
    path = "/api/course-room/student",
    responses(
        (status = 200, description = "Active rooms of the calling student's courses", body = Vec<CourseRoomWithCourse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Student account required", body = ErrorResponse)
    ),
    tag = "Course Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_rooms(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
) -> Result<Json<Vec<CourseRoomWithCourse>>, AppError> {
    let student_id = student.principal_id()?;
    let rooms = CourseRoomService::get_student_rooms(&state.db, student_id).await?;
    Ok(Json(rooms))
}

#[utoipa::path(
    get,
    path = "/api/course-room/{id}",
    params(("id" = Uuid, Path, description = "Course room ID")),
    responses(
        (status = 200, description = "Course room details", body = CourseRoom),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course room not found", body = ErrorResponse)
    ),
    tag = "Course Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_course_room(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseRoom>, AppError> {
    let room = CourseRoomService::get_course_room_by_id(&state.db, id).await?;
    Ok(Json(room))
}

#[utoipa::path(
    put,
    path = "/api/course-room/{id}",
    params(("id" = Uuid, Path, description = "Course room ID")),
    request_body = UpdateCourseRoomDto,
    responses(
        (status = 200, description = "Course room updated", body = CourseRoom),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the room's owner", body = ErrorResponse),
        (status = 404, description = "Course room not found", body = ErrorResponse)
    ),
    tag = "Course Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_course_room(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseRoomDto>,
) -> Result<Json<CourseRoom>, AppError> {
    let teacher_id = teacher.principal_id()?;
    let room = CourseRoomService::update_course_room(&state.db, id, teacher_id, dto).await?;
    Ok(Json(room))
}

#[utoipa::path(
    delete,
    path = "/api/course-room/{id}",
    params(("id" = Uuid, Path, description = "Course room ID")),
    responses(
        (status = 200, description = "Course room deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the room's owner", body = ErrorResponse),
        (status = 404, description = "Course room not found", body = ErrorResponse)
    ),
    tag = "Course Rooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_course_room(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let teacher_id = teacher.principal_id()?;
    CourseRoomService::delete_course_room(&state.db, id, teacher_id).await?;
    Ok(Json(MessageResponse::new("Course room deleted successfully")))
}
