//! Departments and courses.

use fake::Fake;
use fake::faker::company::en::{Buzzword, CatchPhrase, Industry};
use rayon::prelude::*;
use sqlx::{Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{CourseSeed, DepartmentSeed, SEED_COURSE_PREFIX, SEED_DEPARTMENT_MARKER};
use super::sql::{batch_size, values_clause};

const COURSE_LEVELS: [&str; 4] = ["Introduction to", "Foundations of", "Applied", "Advanced"];

pub fn generate_departments(count: usize) -> Vec<DepartmentSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let industry: String = Industry().fake();
            let catch_phrase: String = CatchPhrase().fake();
            DepartmentSeed {
                // The index keeps names unique within a run.
                name: format!("{} {}", industry, idx + 1),
                description: format!("{} {}", SEED_DEPARTMENT_MARKER, catch_phrase),
            }
        })
        .collect()
}

/// Courses for each department, taught round-robin by that department's
/// teachers.
pub fn generate_courses(
    departments: &[(Uuid, Vec<Uuid>)],
    courses_per_department: usize,
) -> Vec<CourseSeed> {
    departments
        .par_iter()
        .enumerate()
        .flat_map_iter(|(dept_idx, (department_id, teachers))| {
            (0..courses_per_department).map(move |course_idx| {
                let topic: String = Buzzword().fake();
                let level = COURSE_LEVELS[course_idx % COURSE_LEVELS.len()];
                CourseSeed {
                    name: format!("{} {}", level, capitalize(&topic)),
                    code: format!("{}{:03}{:02}", SEED_COURSE_PREFIX, dept_idx, course_idx),
                    credits: (1..6).fake::<i32>(),
                    description: CatchPhrase().fake(),
                    department_id: *department_id,
                    teacher_id: (!teachers.is_empty())
                        .then(|| teachers[course_idx % teachers.len()]),
                }
            })
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub async fn insert_departments(
    tx: &mut Transaction<'_, Postgres>,
    departments: &[DepartmentSeed],
) -> anyhow::Result<Vec<Uuid>> {
    let start_time = Instant::now();
    let mut ids = Vec::with_capacity(departments.len());

    for chunk in departments.chunks(batch_size(2)) {
        let query = format!(
            "INSERT INTO departments (name, description) VALUES {} RETURNING id",
            values_clause(chunk.len(), 2, &[])
        );
        let mut q = sqlx::query_scalar::<_, Uuid>(&query);
        for department in chunk {
            q = q.bind(&department.name).bind(&department.description);
        }
        ids.extend(q.fetch_all(&mut **tx).await?);
    }

    println!(
        "   ✓ Inserted {} departments in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

pub async fn insert_courses(
    tx: &mut Transaction<'_, Postgres>,
    courses: &[CourseSeed],
) -> anyhow::Result<Vec<Uuid>> {
    let start_time = Instant::now();
    let mut ids = Vec::with_capacity(courses.len());

    for chunk in courses.chunks(batch_size(6)) {
        let query = format!(
            "INSERT INTO courses (name, code, credits, description, department_id, teacher_id)
             VALUES {} RETURNING id",
            values_clause(chunk.len(), 6, &[])
        );
        let mut q = sqlx::query_scalar::<_, Uuid>(&query);
        for course in chunk {
            q = q
                .bind(&course.name)
                .bind(&course.code)
                .bind(course.credits)
                .bind(&course.description)
                .bind(course.department_id)
                .bind(course.teacher_id);
        }
        ids.extend(q.fetch_all(&mut **tx).await?);
    }

    println!(
        "   ✓ Inserted {} courses in {:?}",
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
    fn test_department_names_unique() {
        let departments = generate_departments(20);
        let names: HashSet<_> = departments.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names.len(), 20);
        assert!(
            departments
                .iter()
                .all(|d| d.description.starts_with(SEED_DEPARTMENT_MARKER))
        );
    }

    #[test]
    fn test_courses_round_robin_teachers() {
        let teachers = vec![Uuid::new_v4(), Uuid::new_v4()];
        let departments = vec![(Uuid::new_v4(), teachers.clone()), (Uuid::new_v4(), vec![])];
        let courses = generate_courses(&departments, 3);

        assert_eq!(courses.len(), 6);
        assert_eq!(courses[0].teacher_id, Some(teachers[0]));
        assert_eq!(courses[1].teacher_id, Some(teachers[1]));
        assert_eq!(courses[2].teacher_id, Some(teachers[0]));
        assert!(courses[3..].iter().all(|c| c.teacher_id.is_none()));

        let codes: HashSet<_> = courses.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes.len(), 6);
        assert!(courses.iter().all(|c| c.code.len() <= 20));
        assert!(courses.iter().all(|c| (1..6).contains(&c.credits)));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("synergy"), "Synergy");
        assert_eq!(capitalize(""), "");
    }
}
