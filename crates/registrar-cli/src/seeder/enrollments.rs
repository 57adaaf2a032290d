use chrono::{Datelike, Utc};
use fake::Fake;
use rayon::prelude::*;
use sqlx::{Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::EnrollmentSeed;
use super::sql::{batch_size, values_clause};

const SEMESTERS: [&str; 3] = ["Fall", "Spring", "Summer"];
const GRADES: [&str; 6] = ["A", "B", "C", "D", "F", "Incomplete"];

/// Enrolls each student in `per_student` distinct courses, starting at a
/// random offset. Roughly half the enrollments already carry a grade.
pub fn generate_enrollments(
    student_ids: &[Uuid],
    course_ids: &[Uuid],
    per_student: usize,
) -> Vec<EnrollmentSeed> {
    if course_ids.is_empty() {
        return Vec::new();
    }
    let per_student = per_student.min(course_ids.len());
    let current_year = Utc::now().year();

    student_ids
        .par_iter()
        .flat_map_iter(|&student_id| {
            let offset = (0..course_ids.len()).fake::<usize>();
            (0..per_student).map(move |k| {
                let graded = (0..2).fake::<u8>() == 0;
                EnrollmentSeed {
                    student_id,
                    course_id: course_ids[(offset + k) % course_ids.len()],
                    semester: SEMESTERS[(0..SEMESTERS.len()).fake::<usize>()],
                    year: current_year - (0..3).fake::<i32>(),
                    grade: graded.then(|| GRADES[(0..GRADES.len()).fake::<usize>()]),
                }
            })
        })
        .collect()
}

pub async fn insert_enrollments(
    tx: &mut Transaction<'_, Postgres>,
    enrollments: &[EnrollmentSeed],
) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    let mut inserted = 0;

    for chunk in enrollments.chunks(batch_size(5)) {
        let query = format!(
            "INSERT INTO enrollments (student_id, course_id, semester, year, grade) VALUES {}",
            values_clause(chunk.len(), 5, &[])
        );
        let mut q = sqlx::query(&query);
        for enrollment in chunk {
            q = q
                .bind(enrollment.student_id)
                .bind(enrollment.course_id)
                .bind(enrollment.semester)
                .bind(enrollment.year)
                .bind(enrollment.grade);
        }
        inserted += q.execute(&mut **tx).await?.rows_affected();
    }

    println!(
        "   ✓ Inserted {} enrollments in {:?}",
        inserted,
        start_time.elapsed()
    );
    Ok(inserted)
}
