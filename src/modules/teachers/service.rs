use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use registrar_core::AppError;

use super::model::{Teacher, UpdateTeacherDto};

const TEACHER_COLUMNS: &str = "id, username, email, first_name, last_name, phone, hire_date, \
     designation, department_id, created_at, updated_at";

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db))]
    pub async fn get_teachers(db: &PgPool) -> Result<Vec<Teacher>, AppError> {
        let teachers = sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await?;

        Ok(teachers)
    }

    #[instrument(skip(db))]
    pub async fn get_teacher_by_id(db: &PgPool, id: Uuid) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))
    }

    #[instrument(skip(db))]
    pub async fn update_teacher(
        db: &PgPool,
        id: Uuid,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let existing = Self::get_teacher_by_id(db, id).await?;

        let teacher = sqlx::query_as::<_, Teacher>(&format!(
            "UPDATE teachers
             SET username = $1, email = $2, first_name = $3, last_name = $4, phone = $5,
                 hire_date = $6, designation = $7, department_id = $8, updated_at = NOW()
             WHERE id = $9
             RETURNING {TEACHER_COLUMNS}"
        ))
        .bind(dto.username.unwrap_or(existing.username))
        .bind(dto.email.unwrap_or(existing.email))
        .bind(dto.first_name.or(existing.first_name))
        .bind(dto.last_name.or(existing.last_name))
        .bind(dto.phone.or(existing.phone))
        .bind(dto.hire_date.or(existing.hire_date))
        .bind(dto.designation.or(existing.designation))
        .bind(dto.department_id.or(existing.department_id))
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow!("Username or email already exists"));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found(anyhow!("Department not found"));
                }
            }
            AppError::from(e)
        })?;

        Ok(teacher)
    }

    /// Removes the teacher. Their courses lose the instructor, their course
    /// rooms are deleted, and any department they head loses its head.
    #[instrument(skip(db))]
    pub async fn delete_teacher(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Teacher not found")));
        }

        Ok(())
    }
}
