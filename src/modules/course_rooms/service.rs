use anyhow::anyhow;
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use registrar_core::AppError;

use crate::modules::courses::service::CourseService;

use super::model::{
    CourseRoom, CourseRoomWithCourse, CreateCourseRoomDto, RoomCourse, UpdateCourseRoomDto,
};

const ROOM_COLUMNS: &str = "id, course_id, teacher_id, room_name, description, is_active, \
     max_capacity, created_at, updated_at";

const ROOM_WITH_COURSE_SELECT: &str = "SELECT r.id, r.course_id, r.teacher_id, r.room_name, \
     r.description, r.is_active, r.max_capacity, r.created_at, r.updated_at, \
     c.name AS course_name, c.code AS course_code \
     FROM course_rooms r JOIN courses c ON c.id = r.course_id";

const ROOM_EXISTS_MESSAGE: &str = "A room already exists for this course";

#[derive(FromRow)]
struct RoomWithCourseRow {
    #[sqlx(flatten)]
    room: CourseRoom,
    course_name: String,
    course_code: String,
}

impl From<RoomWithCourseRow> for CourseRoomWithCourse {
    fn from(row: RoomWithCourseRow) -> Self {
        CourseRoomWithCourse {
            room: row.room,
            course: RoomCourse {
                name: row.course_name,
                code: row.course_code,
            },
        }
    }
}

pub struct CourseRoomService;

impl CourseRoomService {
    pub fn ensure_owner(room: &CourseRoom, teacher_id: Uuid) -> Result<(), AppError> {
        if room.teacher_id != teacher_id {
            return Err(AppError::forbidden(anyhow!(
                "You can only manage your own course rooms"
            )));
        }
        Ok(())
    }

    /// Opens the room for a course the teacher instructs.
    #[instrument(skip(db))]
    pub async fn create_course_room(
        db: &PgPool,
        teacher_id: Uuid,
        dto: CreateCourseRoomDto,
    ) -> Result<CourseRoom, AppError> {
        let course = CourseService::get_course_by_id(db, dto.course_id).await?;
        if course.teacher_id != Some(teacher_id) {
            return Err(AppError::forbidden(anyhow!(
                "You can only create rooms for your own courses"
            )));
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM course_rooms WHERE course_id = $1)",
        )
        .bind(dto.course_id)
        .fetch_one(db)
        .await?;

        if exists {
            return Err(AppError::conflict(anyhow!(ROOM_EXISTS_MESSAGE)));
        }

        let room = sqlx::query_as::<_, CourseRoom>(&format!(
            "INSERT INTO course_rooms (course_id, teacher_id, room_name, description, is_active, max_capacity)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(dto.course_id)
        .bind(teacher_id)
        .bind(&dto.room_name)
        .bind(&dto.description)
        .bind(dto.is_active)
        .bind(dto.max_capacity)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow!(ROOM_EXISTS_MESSAGE));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found(anyhow!("Course not found"));
                }
            }
            AppError::from(e)
        })?;

        info!(room_id = %room.id, course_id = %room.course_id, "Course room created");
        Ok(room)
    }

    #[instrument(skip(db))]
    pub async fn get_course_rooms(db: &PgPool) -> Result<Vec<CourseRoomWithCourse>, AppError> {
        let rows = sqlx::query_as::<_, RoomWithCourseRow>(&format!(
            "{ROOM_WITH_COURSE_SELECT} ORDER BY c.code"
        ))
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().map(CourseRoomWithCourse::from).collect())
    }

    #[instrument(skip(db))]
    pub async fn get_teacher_rooms(
        db: &PgPool,
        teacher_id: Uuid,
    ) -> Result<Vec<CourseRoomWithCourse>, AppError> {
        let rows = sqlx::query_as::<_, RoomWithCourseRow>(&format!(
            "{ROOM_WITH_COURSE_SELECT} WHERE r.teacher_id = $1 ORDER BY c.code"
        ))
        .bind(teacher_id)
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().map(CourseRoomWithCourse::from).collect())
    }

    /// Active rooms of the courses the student is enrolled in.
    #[instrument(skip(db))]
    pub async fn get_student_rooms(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<CourseRoomWithCourse>, AppError> {
        let rows = sqlx::query_as::<_, RoomWithCourseRow>(&format!(
            "{ROOM_WITH_COURSE_SELECT}
             WHERE r.is_active
               AND r.course_id IN (SELECT course_id FROM enrollments WHERE student_id = $1)
             ORDER BY c.code"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().map(CourseRoomWithCourse::from).collect())
    }

    #[instrument(skip(db))]
    pub async fn get_course_room_by_id(db: &PgPool, id: Uuid) -> Result<CourseRoom, AppError> {
        sqlx::query_as::<_, CourseRoom>(&format!(
            "SELECT {ROOM_COLUMNS} FROM course_rooms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Course room not found")))
    }

    #[instrument(skip(db))]
    pub async fn update_course_room(
        db: &PgPool,
        id: Uuid,
        teacher_id: Uuid,
        dto: UpdateCourseRoomDto,
    ) -> Result<CourseRoom, AppError> {
        let existing = Self::get_course_room_by_id(db, id).await?;
        Self::ensure_owner(&existing, teacher_id)?;

        let room = sqlx::query_as::<_, CourseRoom>(&format!(
            "UPDATE course_rooms
             SET room_name = $1, description = $2, is_active = $3, max_capacity = $4,
                 updated_at = NOW()
             WHERE id = $5
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(dto.room_name.unwrap_or(existing.room_name))
        .bind(dto.description.or(existing.description))
        .bind(dto.is_active.unwrap_or(existing.is_active))
        .bind(dto.max_capacity.unwrap_or(existing.max_capacity))
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(room)
    }

    #[instrument(skip(db))]
    pub async fn delete_course_room(db: &PgPool, id: Uuid, teacher_id: Uuid) -> Result<(), AppError> {
        let existing = Self::get_course_room_by_id(db, id).await?;
        Self::ensure_owner(&existing, teacher_id)?;

        let result = sqlx::query("DELETE FROM course_rooms WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Course room not found")));
        }

        info!(room_id = %id, "Course room deleted");
        Ok(())
    }
}
