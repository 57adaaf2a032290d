use anyhow::anyhow;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use registrar_core::AppError;

use crate::metrics::track_enrollment_created;
use crate::modules::students::service::StudentService;

use super::model::{
    CreateEnrollmentDto, EnrolledCourse, Enrollment, StudentEnrollment, UpdateEnrollmentDto,
};

const ENROLLMENT_COLUMNS: &str =
    "id, student_id, course_id, semester, year, enrollment_date, grade, created_at, updated_at";

#[derive(FromRow)]
struct StudentEnrollmentRow {
    id: Uuid,
    course_id: Uuid,
    semester: String,
    year: i32,
    grade: Option<String>,
    enrollment_date: NaiveDate,
    course_name: String,
    course_code: String,
    course_credits: i32,
    course_description: Option<String>,
}

impl From<StudentEnrollmentRow> for StudentEnrollment {
    fn from(row: StudentEnrollmentRow) -> Self {
        StudentEnrollment {
            id: row.id,
            course_id: row.course_id,
            semester: row.semester,
            year: row.year,
            grade: row.grade,
            enrollment_date: row.enrollment_date,
            course: EnrolledCourse {
                id: row.course_id,
                name: row.course_name,
                code: row.course_code,
                credits: row.course_credits,
                description: row.course_description,
            },
        }
    }
}

pub struct EnrollmentService;

impl EnrollmentService {
    /// Enrolls `student_id` in `dto.course_id`, dated today.
    ///
    /// Repeat enrollments in the same course, semester and year are allowed.
    #[instrument(skip(db))]
    pub async fn create_enrollment(
        db: &PgPool,
        student_id: Uuid,
        dto: CreateEnrollmentDto,
    ) -> Result<Enrollment, AppError> {
        if !StudentService::student_exists(db, student_id).await? {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        let course_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                .bind(dto.course_id)
                .fetch_one(db)
                .await?;

        if !course_exists {
            return Err(AppError::not_found(anyhow!("Course not found")));
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "INSERT INTO enrollments (student_id, course_id, semester, year, enrollment_date)
             VALUES ($1, $2, $3, $4, CURRENT_DATE)
             RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(student_id)
        .bind(dto.course_id)
        .bind(&dto.semester)
        .bind(dto.year)
        .fetch_one(db)
        .await
        .map_err(|e| {
            // Student or course removed after the existence checks.
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found(anyhow!("Student or course not found"));
            }
            AppError::from(e)
        })?;

        track_enrollment_created();
        info!(enrollment_id = %enrollment.id, "Student enrolled");
        Ok(enrollment)
    }

    /// All enrollments, or only those of `student_id` when given.
    #[instrument(skip(db))]
    pub async fn get_enrollments(
        db: &PgPool,
        student_id: Option<Uuid>,
    ) -> Result<Vec<Enrollment>, AppError> {
        let enrollments = sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
             WHERE ($1::uuid IS NULL OR student_id = $1)
             ORDER BY year DESC, enrollment_date DESC"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await?;

        Ok(enrollments)
    }

    #[instrument(skip(db))]
    pub async fn get_student_enrollments(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<StudentEnrollment>, AppError> {
        if !StudentService::student_exists(db, student_id).await? {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        let rows = sqlx::query_as::<_, StudentEnrollmentRow>(
            r#"SELECT
                e.id, e.course_id, e.semester, e.year, e.grade, e.enrollment_date,
                c.name AS course_name,
                c.code AS course_code,
                c.credits AS course_credits,
                c.description AS course_description
               FROM enrollments e
               JOIN courses c ON c.id = e.course_id
               WHERE e.student_id = $1
               ORDER BY e.year DESC, e.enrollment_date DESC"#,
        )
        .bind(student_id)
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().map(StudentEnrollment::from).collect())
    }

    #[instrument(skip(db))]
    pub async fn get_enrollment_by_id(db: &PgPool, id: Uuid) -> Result<Enrollment, AppError> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Enrollment not found")))
    }

    #[instrument(skip(db))]
    pub async fn update_enrollment(
        db: &PgPool,
        id: Uuid,
        dto: UpdateEnrollmentDto,
    ) -> Result<Enrollment, AppError> {
        let existing = Self::get_enrollment_by_id(db, id).await?;

        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "UPDATE enrollments
             SET semester = $1, year = $2, grade = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(dto.semester.unwrap_or(existing.semester))
        .bind(dto.year.unwrap_or(existing.year))
        .bind(dto.grade.or(existing.grade))
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(enrollment)
    }

    #[instrument(skip(db))]
    pub async fn delete_enrollment(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Enrollment not found")));
        }

        Ok(())
    }
}
