use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_MAX_CAPACITY: i32 = 50;

fn default_max_capacity() -> i32 {
    DEFAULT_MAX_CAPACITY
}

fn default_is_active() -> bool {
    true
}

/// A course's virtual room. Each course has at most one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRoom {
    pub id: Uuid,
    pub course_id: Uuid,
    /// Owning teacher
    pub teacher_id: Uuid,
    pub room_name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub max_capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RoomCourse {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CourseRoomWithCourse {
    #[serde(flatten)]
    pub room: CourseRoom,
    pub course: RoomCourse,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRoomDto {
    pub course_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Room name must be between 1 and 100 characters"))]
    pub room_name: String,
    pub description: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default = "default_max_capacity")]
    #[validate(range(min = 1, max = 10000, message = "Max capacity must be between 1 and 10000"))]
    pub max_capacity: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRoomDto {
    #[validate(length(min = 1, max = 100, message = "Room name must be between 1 and 100 characters"))]
    pub room_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 1, max = 10000, message = "Max capacity must be between 1 and 10000"))]
    pub max_capacity: Option<i32>,
}
