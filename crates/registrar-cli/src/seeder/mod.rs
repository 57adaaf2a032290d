//! Demo data seeding.
//!
//! Rows are generated in parallel with rayon and `fake`, then written with
//! multi-row INSERTs inside a single transaction, so a failed run leaves
//! nothing behind. Seeded rows carry markers ([`SEED_EMAIL_DOMAIN`],
//! [`SEED_COURSE_PREFIX`], [`SEED_DEPARTMENT_MARKER`]) that [`clear_all`]
//! uses to remove them again.

pub mod catalog;
pub mod enrollments;
pub mod models;
pub mod people;
mod sql;

use std::time::Instant;

use sqlx::PgPool;
use uuid::Uuid;

use registrar_core::hash_password;

pub use models::*;

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> anyhow::Result<SeedSummary> {
    let start_time = Instant::now();
    println!("🌱 Seeding database...");
    println!(
        "   {} departments, {} teachers, {} courses, {} students, ~{} enrollments",
        config.departments,
        config.total_teachers(),
        config.total_courses(),
        config.students,
        config.total_enrollments()
    );

    // Every seeded account shares one hash.
    let password_hash = hash_password(SEED_PASSWORD).map_err(|e| e.error)?;

    let mut tx = db.begin().await?;

    let departments = catalog::generate_departments(config.departments);
    let department_ids = catalog::insert_departments(&mut tx, &departments).await?;

    let teachers =
        people::generate_teachers(&department_ids, config.teachers_per_department, &password_hash);
    let teacher_ids = people::insert_teachers(&mut tx, &teachers).await?;

    let staff: Vec<(Uuid, Vec<Uuid>)> = department_ids
        .iter()
        .map(|&department_id| {
            let members = teachers
                .iter()
                .zip(&teacher_ids)
                .filter(|(teacher, _)| teacher.department_id == department_id)
                .map(|(_, &id)| id)
                .collect();
            (department_id, members)
        })
        .collect();

    let courses = catalog::generate_courses(&staff, config.courses_per_department);
    let course_ids = catalog::insert_courses(&mut tx, &courses).await?;

    let students = people::generate_students(config.students, &password_hash);
    let student_ids = people::insert_students(&mut tx, &students).await?;

    let enrollment_rows = enrollments::generate_enrollments(
        &student_ids,
        &course_ids,
        config.enrollments_per_student,
    );
    let enrolled = enrollments::insert_enrollments(&mut tx, &enrollment_rows).await?;

    tx.commit().await?;

    println!("✅ Seeding complete in {:?}", start_time.elapsed());
    println!("   Every seeded account uses the password '{}'", SEED_PASSWORD);

    Ok(SeedSummary {
        departments: department_ids.len(),
        teachers: teacher_ids.len(),
        courses: course_ids.len(),
        students: student_ids.len(),
        enrollments: enrolled as usize,
    })
}

/// Deletes every seeded row. Enrollments, attendance and course rooms go
/// with their courses and students.
pub async fn clear_all(db: &PgPool) -> anyhow::Result<ClearSummary> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let email_pattern = format!("%@{}", SEED_EMAIL_DOMAIN);
    let mut tx = db.begin().await?;

    let courses = sqlx::query("DELETE FROM courses WHERE code LIKE $1")
        .bind(format!("{}%", SEED_COURSE_PREFIX))
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let students = sqlx::query("DELETE FROM students WHERE email LIKE $1")
        .bind(&email_pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let teachers = sqlx::query("DELETE FROM teachers WHERE email LIKE $1")
        .bind(&email_pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    // Departments still holding non-seeded courses or teachers are kept.
    let departments = sqlx::query(
        "DELETE FROM departments d
         WHERE d.description LIKE $1
           AND NOT EXISTS (SELECT 1 FROM courses c WHERE c.department_id = d.id)
           AND NOT EXISTS (SELECT 1 FROM teachers t WHERE t.department_id = d.id)",
    )
    .bind(format!("{}%", SEED_DEPARTMENT_MARKER))
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    println!(
        "   ✓ Deleted {} courses, {} students, {} teachers, {} departments in {:?}",
        courses,
        students,
        teachers,
        departments,
        start_time.elapsed()
    );

    Ok(ClearSummary {
        departments,
        teachers,
        courses,
        students,
    })
}
