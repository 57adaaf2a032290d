//! Teacher and student accounts.

use chrono::{Duration, NaiveDate, Utc};
use fake::Fake;
use fake::faker::company::en::Profession;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rayon::prelude::*;
use sqlx::{Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{SEED_EMAIL_DOMAIN, StudentSeed, TeacherSeed};
use super::sql::{batch_size, values_clause};

const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
const DESIGNATIONS: [&str; 4] = ["Lecturer", "Senior Lecturer", "Associate Professor", "Professor"];

/// `first.last.<prefix><idx>`, lowercased and stripped to ASCII
/// alphanumerics so it stays within the 50-character username limit.
fn seeded_username(first: &str, last: &str, prefix: &str, idx: usize) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .filter(char::is_ascii_alphanumeric)
            .take(16)
            .collect::<String>()
            .to_lowercase()
    };
    format!("{}.{}.{}{}", clean(first), clean(last), prefix, idx)
}

fn days_ago(today: NaiveDate, min: i64, max: i64) -> NaiveDate {
    today - Duration::days((min..max).fake::<i64>())
}

pub fn generate_teachers(
    department_ids: &[Uuid],
    teachers_per_department: usize,
    password_hash: &str,
) -> Vec<TeacherSeed> {
    let today = Utc::now().date_naive();

    department_ids
        .par_iter()
        .enumerate()
        .flat_map_iter(|(dept_idx, &department_id)| {
            (0..teachers_per_department).map(move |idx| {
                let first_name: String = FirstName().fake();
                let last_name: String = LastName().fake();
                let username = seeded_username(
                    &first_name,
                    &last_name,
                    "t",
                    dept_idx * teachers_per_department + idx,
                );
                let profession: String = Profession().fake();

                TeacherSeed {
                    email: format!("{}@{}", username, SEED_EMAIL_DOMAIN),
                    username,
                    password_hash: password_hash.to_string(),
                    first_name,
                    last_name,
                    phone: PhoneNumber().fake(),
                    hire_date: days_ago(today, 30, 20 * 365),
                    designation: format!(
                        "{} ({})",
                        DESIGNATIONS[idx % DESIGNATIONS.len()],
                        profession
                    ),
                    department_id,
                }
            })
        })
        .collect()
}

pub fn generate_students(count: usize, password_hash: &str) -> Vec<StudentSeed> {
    let today = Utc::now().date_naive();

    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let username = seeded_username(&first_name, &last_name, "s", idx);

            StudentSeed {
                email: format!("{}@{}", username, SEED_EMAIL_DOMAIN),
                username,
                password_hash: password_hash.to_string(),
                first_name,
                last_name,
                phone: PhoneNumber().fake(),
                gender: GENDERS[(0..GENDERS.len()).fake::<usize>()],
                date_of_birth: days_ago(today, 17 * 365, 30 * 365),
                enrollment_date: days_ago(today, 0, 4 * 365),
            }
        })
        .collect()
}

pub async fn insert_teachers(
    tx: &mut Transaction<'_, Postgres>,
    teachers: &[TeacherSeed],
) -> anyhow::Result<Vec<Uuid>> {
    let start_time = Instant::now();
    let mut ids = Vec::with_capacity(teachers.len());

    for chunk in teachers.chunks(batch_size(9)) {
        let query = format!(
            "INSERT INTO teachers
             (username, email, password, first_name, last_name, phone, hire_date, designation, department_id)
             VALUES {} RETURNING id",
            values_clause(chunk.len(), 9, &[])
        );
        let mut q = sqlx::query_scalar::<_, Uuid>(&query);
        for teacher in chunk {
            q = q
                .bind(&teacher.username)
                .bind(&teacher.email)
                .bind(&teacher.password_hash)
                .bind(&teacher.first_name)
                .bind(&teacher.last_name)
                .bind(&teacher.phone)
                .bind(teacher.hire_date)
                .bind(&teacher.designation)
                .bind(teacher.department_id);
        }
        ids.extend(q.fetch_all(&mut **tx).await?);
    }

    println!(
        "   ✓ Inserted {} teachers in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

pub async fn insert_students(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> anyhow::Result<Vec<Uuid>> {
    let start_time = Instant::now();
    let mut ids = Vec::with_capacity(students.len());

    for chunk in students.chunks(batch_size(9)) {
        let query = format!(
            "INSERT INTO students
             (username, email, password, first_name, last_name, phone, gender, date_of_birth, enrollment_date)
             VALUES {} RETURNING id",
            values_clause(chunk.len(), 9, &[(6, "gender")])
        );
        let mut q = sqlx::query_scalar::<_, Uuid>(&query);
        for student in chunk {
            q = q
                .bind(&student.username)
                .bind(&student.email)
                .bind(&student.password_hash)
                .bind(&student.first_name)
                .bind(&student.last_name)
                .bind(&student.phone)
                .bind(student.gender)
                .bind(student.date_of_birth)
                .bind(student.enrollment_date);
        }
        ids.extend(q.fetch_all(&mut **tx).await?);
    }

    println!(
        "   ✓ Inserted {} students in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seeded_username_is_clean() {
        assert_eq!(seeded_username("Mary-Ann", "O'Neil", "s", 7), "maryann.oneil.s7");
        assert!(seeded_username(&"x".repeat(40), &"y".repeat(40), "t", 99_999).len() <= 50);
    }

    #[test]
    fn test_teachers_cover_every_department() {
        let departments = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let teachers = generate_teachers(&departments, 2, "hash");

        assert_eq!(teachers.len(), 6);
        for department_id in &departments {
            assert_eq!(
                teachers
                    .iter()
                    .filter(|t| t.department_id == *department_id)
                    .count(),
                2
            );
        }
        let usernames: HashSet<_> = teachers.iter().map(|t| t.username.as_str()).collect();
        assert_eq!(usernames.len(), 6);
    }

    #[test]
    fn test_students_are_seed_marked() {
        let students = generate_students(25, "hash");
        let today = Utc::now().date_naive();

        assert_eq!(students.len(), 25);
        assert!(students.iter().all(|s| s.email.ends_with(SEED_EMAIL_DOMAIN)));
        assert!(students.iter().all(|s| GENDERS.contains(&s.gender)));
        assert!(students.iter().all(|s| s.date_of_birth < today));
        assert!(students.iter().all(|s| s.enrollment_date <= today));
    }
}
