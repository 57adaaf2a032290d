//! Teacher account creation outside the HTTP API.

use anyhow::{Context, anyhow, bail};
use sqlx::PgPool;
use uuid::Uuid;

use registrar_core::hash_password;

pub struct NewTeacher {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Applies the same rules as `POST /api/teacher/register`.
pub fn validate_new_teacher(teacher: &NewTeacher) -> anyhow::Result<()> {
    let username_len = teacher.username.chars().count();
    if !(3..=50).contains(&username_len) {
        bail!("Username must be between 3 and 50 characters");
    }
    if !teacher.email.contains('@') {
        bail!("Invalid email address");
    }
    if teacher.password.chars().count() < 5 {
        bail!("Password must be at least 5 characters");
    }
    Ok(())
}

pub async fn create_teacher(db: &PgPool, teacher: &NewTeacher) -> anyhow::Result<Uuid> {
    validate_new_teacher(teacher)?;

    let hashed_password = hash_password(&teacher.password).map_err(|e| e.error)?;

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO teachers (username, email, password, first_name, last_name)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT DO NOTHING
         RETURNING id",
    )
    .bind(&teacher.username)
    .bind(&teacher.email)
    .bind(&hashed_password)
    .bind(&teacher.first_name)
    .bind(&teacher.last_name)
    .fetch_optional(db)
    .await
    .context("Failed to insert teacher")?;

    id.ok_or_else(|| anyhow!("A teacher with this username or email already exists"))
}
