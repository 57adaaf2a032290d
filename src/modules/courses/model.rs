use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub credits: i32,
    pub description: Option<String>,
    pub department_id: Option<Uuid>,
    /// Instructing teacher
    pub teacher_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Code must be between 1 and 20 characters"))]
    pub code: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 30, message = "Credits must be between 0 and 30"))]
    pub credits: i32,
    pub description: Option<String>,
    pub department_id: Option<Uuid>,
    /// Defaults to the calling teacher
    pub teacher_id: Option<Uuid>,
}

/// Partial update. Absent and `null` fields both keep the stored value, so
/// nullable columns cannot be cleared through this DTO.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Code must be between 1 and 20 characters"))]
    pub code: Option<String>,
    #[validate(range(min = 0, max = 30, message = "Credits must be between 0 and 30"))]
    pub credits: Option<i32>,
    pub description: Option<String>,
    pub department_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
}
