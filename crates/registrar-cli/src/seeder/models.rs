//! Seed rows and the knobs that size a seeding run.

use chrono::NaiveDate;
use uuid::Uuid;

/// Email domain of every seeded student and teacher.
pub const SEED_EMAIL_DOMAIN: &str = "seed.example.com";

/// Prefix of every seeded course code.
pub const SEED_COURSE_PREFIX: &str = "SEED-";

/// Prefix of every seeded department description.
pub const SEED_DEPARTMENT_MARKER: &str = "Seeded department:";

/// Password shared by every seeded account.
pub const SEED_PASSWORD: &str = "password123";

pub struct DepartmentSeed {
    pub name: String,
    pub description: String,
}

pub struct TeacherSeed {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub hire_date: NaiveDate,
    pub designation: String,
    pub department_id: Uuid,
}

pub struct StudentSeed {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub gender: &'static str,
    pub date_of_birth: NaiveDate,
    pub enrollment_date: NaiveDate,
}

pub struct CourseSeed {
    pub name: String,
    pub code: String,
    pub credits: i32,
    pub description: String,
    pub department_id: Uuid,
    pub teacher_id: Option<Uuid>,
}

pub struct EnrollmentSeed {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub semester: &'static str,
    pub year: i32,
    pub grade: Option<&'static str>,
}

#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub departments: usize,
    pub teachers_per_department: usize,
    pub courses_per_department: usize,
    pub students: usize,
    pub enrollments_per_student: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            departments: 5,
            teachers_per_department: 4,
            courses_per_department: 6,
            students: 200,
            enrollments_per_student: 4,
        }
    }
}

impl SeedConfig {
    pub fn total_teachers(&self) -> usize {
        self.departments * self.teachers_per_department
    }

    pub fn total_courses(&self) -> usize {
        self.departments * self.courses_per_department
    }

    /// A student cannot hold more distinct enrollments than there are courses.
    pub fn total_enrollments(&self) -> usize {
        self.students * self.enrollments_per_student.min(self.total_courses())
    }
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub departments: usize,
    pub teachers: usize,
    pub courses: usize,
    pub students: usize,
    pub enrollments: usize,
}

#[derive(Debug, Default)]
pub struct ClearSummary {
    pub departments: u64,
    pub teachers: u64,
    pub courses: u64,
    pub students: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let config = SeedConfig {
            departments: 3,
            teachers_per_department: 2,
            courses_per_department: 4,
            students: 10,
            enrollments_per_student: 5,
        };
        assert_eq!(config.total_teachers(), 6);
        assert_eq!(config.total_courses(), 12);
        assert_eq!(config.total_enrollments(), 50);
    }

    #[test]
    fn test_enrollments_capped_by_courses() {
        let config = SeedConfig {
            departments: 1,
            courses_per_department: 2,
            students: 10,
            enrollments_per_student: 5,
            ..Default::default()
        };
        assert_eq!(config.total_enrollments(), 20);
    }
}
