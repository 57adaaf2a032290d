use std::collections::HashMap;

use anyhow::anyhow;
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use registrar_core::AppError;

use super::model::{
    CreateDepartmentDto, Department, DepartmentCourseSummary, DepartmentTeacherSummary,
    DepartmentWithMembers, UpdateDepartmentDto,
};

const DEPARTMENT_COLUMNS: &str = "id, name, description, head_of_department, created_at, updated_at";

const HAS_MEMBERS_MESSAGE: &str = "Cannot delete department. It has associated courses or teachers.";

#[derive(FromRow)]
struct CourseMemberRow {
    department_id: Uuid,
    #[sqlx(flatten)]
    course: DepartmentCourseSummary,
}

#[derive(FromRow)]
struct TeacherMemberRow {
    department_id: Uuid,
    #[sqlx(flatten)]
    teacher: DepartmentTeacherSummary,
}

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow!("Department name already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::not_found(anyhow!("Head of department teacher not found"));
        }
    }
    AppError::from(e)
}

pub struct DepartmentService;

impl DepartmentService {
    #[instrument(skip(db))]
    pub async fn create_department(
        db: &PgPool,
        dto: CreateDepartmentDto,
    ) -> Result<Department, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE name = $1)",
        )
        .bind(&dto.name)
        .fetch_one(db)
        .await?;

        if exists {
            return Err(AppError::conflict(anyhow!("Department already exists")));
        }

        let department = sqlx::query_as::<_, Department>(&format!(
            "INSERT INTO departments (name, description, head_of_department)
             VALUES ($1, $2, $3)
             RETURNING {DEPARTMENT_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.head_of_department)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow!("Department already exists"));
            }
            map_write_error(e)
        })?;

        info!(department_id = %department.id, "Department created");
        Ok(department)
    }

    /// Every department with its courses and teachers, in three queries.
    #[instrument(skip(db))]
    pub async fn get_departments(db: &PgPool) -> Result<Vec<DepartmentWithMembers>, AppError> {
        let departments = sqlx::query_as::<_, Department>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY name"
        ))
        .fetch_all(db)
        .await?;

        let course_rows = sqlx::query_as::<_, CourseMemberRow>(
            "SELECT department_id, id, name, code, credits
             FROM courses WHERE department_id IS NOT NULL ORDER BY code",
        )
        .fetch_all(db)
        .await?;

        let teacher_rows = sqlx::query_as::<_, TeacherMemberRow>(
            "SELECT department_id, id, username, email, first_name, last_name
             FROM teachers WHERE department_id IS NOT NULL ORDER BY username",
        )
        .fetch_all(db)
        .await?;

        let mut courses: HashMap<Uuid, Vec<DepartmentCourseSummary>> = HashMap::new();
        for row in course_rows {
            courses.entry(row.department_id).or_default().push(row.course);
        }

        let mut teachers: HashMap<Uuid, Vec<DepartmentTeacherSummary>> = HashMap::new();
        for row in teacher_rows {
            teachers
                .entry(row.department_id)
                .or_default()
                .push(row.teacher);
        }

        Ok(departments
            .into_iter()
            .map(|department| DepartmentWithMembers {
                courses: courses.remove(&department.id).unwrap_or_default(),
                teachers: teachers.remove(&department.id).unwrap_or_default(),
                department,
            })
            .collect())
    }

    async fn find_department(db: &PgPool, id: Uuid) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Department not found")))
    }

    pub async fn department_exists(db: &PgPool, id: Uuid) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM departments WHERE id = $1)")
                .bind(id)
                .fetch_one(db)
                .await?;
        Ok(exists)
    }

    #[instrument(skip(db))]
    pub async fn get_department_by_id(
        db: &PgPool,
        id: Uuid,
    ) -> Result<DepartmentWithMembers, AppError> {
        let department = Self::find_department(db, id).await?;

        let courses = sqlx::query_as::<_, DepartmentCourseSummary>(
            "SELECT id, name, code, credits FROM courses WHERE department_id = $1 ORDER BY code",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        let teachers = sqlx::query_as::<_, DepartmentTeacherSummary>(
            "SELECT id, username, email, first_name, last_name
             FROM teachers WHERE department_id = $1 ORDER BY username",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(DepartmentWithMembers {
            department,
            courses,
            teachers,
        })
    }

    #[instrument(skip(db))]
    pub async fn update_department(
        db: &PgPool,
        id: Uuid,
        dto: UpdateDepartmentDto,
    ) -> Result<Department, AppError> {
        let existing = Self::find_department(db, id).await?;

        if let Some(name) = &dto.name
            && *name != existing.name
        {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM departments WHERE name = $1 AND id <> $2)",
            )
            .bind(name)
            .bind(id)
            .fetch_one(db)
            .await?;

            if taken {
                return Err(AppError::conflict(anyhow!(
                    "Department name already exists"
                )));
            }
        }

        let department = sqlx::query_as::<_, Department>(&format!(
            "UPDATE departments
             SET name = $1, description = $2, head_of_department = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING {DEPARTMENT_COLUMNS}"
        ))
        .bind(dto.name.unwrap_or(existing.name))
        .bind(dto.description.or(existing.description))
        .bind(dto.head_of_department.or(existing.head_of_department))
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(map_write_error)?;

        Ok(department)
    }

    /// Deletes a department that has no courses and no teachers.
    ///
    /// The row is locked `FOR UPDATE` so a course or teacher cannot be
    /// attached between the member counts and the delete.
    #[instrument(skip(db))]
    pub async fn delete_department(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM departments WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            return Err(AppError::not_found(anyhow!("Department not found")));
        }

        let courses_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses WHERE department_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        let teachers_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM teachers WHERE department_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if courses_count > 0 || teachers_count > 0 {
            return Err(AppError::conflict(anyhow!(HAS_MEMBERS_MESSAGE)));
        }

        sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return AppError::conflict(anyhow!(HAS_MEMBERS_MESSAGE));
                }
                AppError::from(e)
            })?;

        tx.commit().await?;

        info!(department_id = %id, "Department deleted");
        Ok(())
    }
}
