use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use registrar_core::AppError;

use crate::metrics::track_attendance_recorded;
use crate::modules::courses::service::CourseService;
use crate::modules::students::service::StudentService;

use super::model::{Attendance, RecordAttendanceDto};

const ATTENDANCE_COLUMNS: &str =
    "id, student_id, course_id, attendance_date, status, created_at, updated_at";

pub struct AttendanceService;

impl AttendanceService {
    /// Records one attendance mark, replacing any earlier mark for the same
    /// student, course and date.
    ///
    /// Only the course's instructor may record; a course with no instructor
    /// accepts no marks.
    #[instrument(skip(db))]
    pub async fn record_attendance(
        db: &PgPool,
        teacher_id: Uuid,
        dto: RecordAttendanceDto,
    ) -> Result<Attendance, AppError> {
        let course = CourseService::get_course_by_id(db, dto.course_id).await?;
        if course.teacher_id != Some(teacher_id) {
            return Err(AppError::forbidden(anyhow!(
                "Only the course's instructor can record attendance"
            )));
        }

        if !StudentService::student_exists(db, dto.student_id).await? {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        let attendance = sqlx::query_as::<_, Attendance>(&format!(
            "INSERT INTO attendance (student_id, course_id, attendance_date, status)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (student_id, course_id, attendance_date)
             DO UPDATE SET status = EXCLUDED.status, updated_at = NOW()
             RETURNING {ATTENDANCE_COLUMNS}"
        ))
        .bind(dto.student_id)
        .bind(dto.course_id)
        .bind(dto.attendance_date)
        .bind(dto.status)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found(anyhow!("Student or course not found"));
            }
            AppError::from(e)
        })?;

        track_attendance_recorded(dto.status.as_str());
        info!(
            attendance_id = %attendance.id,
            status = dto.status.as_str(),
            "Attendance recorded"
        );
        Ok(attendance)
    }

    #[instrument(skip(db))]
    pub async fn get_student_attendance(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<Attendance>, AppError> {
        if !StudentService::student_exists(db, student_id).await? {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        let records = sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance
             WHERE student_id = $1
             ORDER BY attendance_date DESC, created_at DESC"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await?;

        Ok(records)
    }

    #[instrument(skip(db))]
    pub async fn get_course_attendance(
        db: &PgPool,
        course_id: Uuid,
    ) -> Result<Vec<Attendance>, AppError> {
        // 404 for an unknown course rather than an empty list
        CourseService::get_course_by_id(db, course_id).await?;

        let records = sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance
             WHERE course_id = $1
             ORDER BY attendance_date DESC, created_at DESC"
        ))
        .bind(course_id)
        .fetch_all(db)
        .await?;

        Ok(records)
    }
}
