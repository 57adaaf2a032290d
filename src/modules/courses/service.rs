use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use registrar_core::AppError;

use crate::modules::departments::service::DepartmentService;

use super::model::{Course, CreateCourseDto, UpdateCourseDto};

const COURSE_COLUMNS: &str =
    "id, name, code, credits, description, department_id, teacher_id, created_at, updated_at";

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow!("Course code already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return match db_err.constraint() {
                Some("courses_teacher_id_fkey") => {
                    AppError::not_found(anyhow!("Teacher not found"))
                }
                _ => AppError::not_found(anyhow!("Department not found")),
            };
        }
    }
    AppError::from(e)
}

pub struct CourseService;

impl CourseService {
    async fn code_taken(db: &PgPool, code: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM courses WHERE code = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(code)
        .bind(except)
        .fetch_one(db)
        .await?;
        Ok(taken)
    }

    async fn ensure_department(db: &PgPool, department_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(department_id) = department_id
            && !DepartmentService::department_exists(db, department_id).await?
        {
            return Err(AppError::not_found(anyhow!("Department not found")));
        }
        Ok(())
    }

    /// Creates a course taught by `dto.teacher_id`, or by `acting_teacher`
    /// when none is given.
    #[instrument(skip(db))]
    pub async fn create_course(
        db: &PgPool,
        acting_teacher: Uuid,
        dto: CreateCourseDto,
    ) -> Result<Course, AppError> {
        if Self::code_taken(db, &dto.code, None).await? {
            return Err(AppError::conflict(anyhow!("Course code already exists")));
        }
        Self::ensure_department(db, dto.department_id).await?;

        let course = sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (name, code, credits, description, department_id, teacher_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(dto.credits)
        .bind(&dto.description)
        .bind(dto.department_id)
        .bind(dto.teacher_id.unwrap_or(acting_teacher))
        .fetch_one(db)
        .await
        .map_err(map_write_error)?;

        info!(course_id = %course.id, code = %course.code, "Course created");
        Ok(course)
    }

    #[instrument(skip(db))]
    pub async fn get_courses(db: &PgPool) -> Result<Vec<Course>, AppError> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY code"
        ))
        .fetch_all(db)
        .await?;

        Ok(courses)
    }

    #[instrument(skip(db))]
    pub async fn get_course_by_id(db: &PgPool, id: Uuid) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))
    }

    /// Only the instructing teacher may modify a course. A course without an
    /// instructor can be modified by any teacher.
    pub fn ensure_instructor(course: &Course, teacher_id: Uuid) -> Result<(), AppError> {
        match course.teacher_id {
            Some(instructor) if instructor != teacher_id => Err(AppError::forbidden(anyhow!(
                "Only the course's instructor can modify this course"
            ))),
            _ => Ok(()),
        }
    }

    #[instrument(skip(db))]
    pub async fn update_course(
        db: &PgPool,
        id: Uuid,
        acting_teacher: Uuid,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        let existing = Self::get_course_by_id(db, id).await?;
        Self::ensure_instructor(&existing, acting_teacher)?;

        if let Some(code) = &dto.code
            && *code != existing.code
            && Self::code_taken(db, code, Some(id)).await?
        {
            return Err(AppError::conflict(anyhow!("Course code already exists")));
        }
        Self::ensure_department(db, dto.department_id).await?;

        let mut tx = db.begin().await?;

        let course = sqlx::query_as::<_, Course>(&format!(
            "UPDATE courses
             SET name = $1, code = $2, credits = $3, description = $4, department_id = $5,
                 teacher_id = $6, updated_at = NOW()
             WHERE id = $7
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(dto.name.unwrap_or(existing.name))
        .bind(dto.code.unwrap_or(existing.code))
        .bind(dto.credits.unwrap_or(existing.credits))
        .bind(dto.description.or(existing.description))
        .bind(dto.department_id.or(existing.department_id))
        .bind(dto.teacher_id.or(existing.teacher_id))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        // The course room follows its course's instructor.
        if let Some(instructor) = course.teacher_id
            && course.teacher_id != existing.teacher_id
        {
            sqlx::query(
                "UPDATE course_rooms SET teacher_id = $1, updated_at = NOW() WHERE course_id = $2",
            )
            .bind(instructor)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            info!(course_id = %id, teacher_id = %instructor, "Course reassigned");
        }

        tx.commit().await?;

        Ok(course)
    }

    /// Deletes the course with its enrollments, attendance and room.
    #[instrument(skip(db))]
    pub async fn delete_course(db: &PgPool, id: Uuid, acting_teacher: Uuid) -> Result<(), AppError> {
        let existing = Self::get_course_by_id(db, id).await?;
        Self::ensure_instructor(&existing, acting_teacher)?;

        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Course not found")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn course_taught_by(teacher_id: Option<Uuid>) -> Course {
        Course {
            id: Uuid::new_v4(),
            name: "Databases".to_string(),
            code: "CS340".to_string(),
            credits: 3,
            description: None,
            department_id: None,
            teacher_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_instructor_may_modify() {
        let teacher = Uuid::new_v4();
        assert!(CourseService::ensure_instructor(&course_taught_by(Some(teacher)), teacher).is_ok());
    }

    #[test]
    fn test_other_teacher_is_forbidden() {
        let course = course_taught_by(Some(Uuid::new_v4()));
        let err = CourseService::ensure_instructor(&course, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }

    #[test]
    fn test_unassigned_course_is_open() {
        assert!(CourseService::ensure_instructor(&course_taught_by(None), Uuid::new_v4()).is_ok());
    }
}
