use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use registrar_core::AppError;

use super::model::{Student, UpdateStudentDto};

const STUDENT_COLUMNS: &str = "id, username, email, first_name, last_name, phone, gender, \
     date_of_birth, enrollment_date, status, created_at, updated_at";

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db))]
    pub async fn get_students(db: &PgPool) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await?;

        Ok(students)
    }

    #[instrument(skip(db))]
    pub async fn get_student_by_id(db: &PgPool, id: Uuid) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    pub async fn student_exists(db: &PgPool, id: Uuid) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
                .bind(id)
                .fetch_one(db)
                .await?;
        Ok(exists)
    }

    #[instrument(skip(db))]
    pub async fn update_student(
        db: &PgPool,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let existing = Self::get_student_by_id(db, id).await?;

        let student = sqlx::query_as::<_, Student>(&format!(
            "UPDATE students
             SET username = $1, email = $2, first_name = $3, last_name = $4, phone = $5,
                 gender = $6, date_of_birth = $7, enrollment_date = $8, status = $9,
                 updated_at = NOW()
             WHERE id = $10
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(dto.username.unwrap_or(existing.username))
        .bind(dto.email.unwrap_or(existing.email))
        .bind(dto.first_name.or(existing.first_name))
        .bind(dto.last_name.or(existing.last_name))
        .bind(dto.phone.or(existing.phone))
        .bind(dto.gender.or(existing.gender))
        .bind(dto.date_of_birth.or(existing.date_of_birth))
        .bind(dto.enrollment_date.or(existing.enrollment_date))
        .bind(dto.status.unwrap_or(existing.status))
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow!("Username or email already exists"));
            }
            AppError::from(e)
        })?;

        Ok(student)
    }

    /// Removes the student; enrollments and attendance go with it.
    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        Ok(())
    }
}
