use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub semester: String,
    pub year: i32,
    pub enrollment_date: NaiveDate,
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub credits: i32,
    pub description: Option<String>,
}

/// One of a student's enrollments joined with the course it refers to.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentEnrollment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub semester: String,
    pub year: i32,
    pub grade: Option<String>,
    pub enrollment_date: NaiveDate,
    pub course: EnrolledCourse,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentDto {
    /// Required for teachers; students may omit it to enroll themselves
    pub student_id: Option<Uuid>,
    pub course_id: Uuid,
    #[validate(length(min = 1, max = 50, message = "Semester must be between 1 and 50 characters"))]
    pub semester: String,
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub year: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollmentDto {
    #[validate(length(min = 1, max = 50, message = "Semester must be between 1 and 50 characters"))]
    pub semester: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub year: Option<i32>,
    #[validate(length(min = 1, max = 10, message = "Grade must be between 1 and 10 characters"))]
    pub grade: Option<String>,
}
