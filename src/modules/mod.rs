pub mod attendance;
pub mod auth;
pub mod course_rooms;
pub mod courses;
pub mod departments;
pub mod enrollments;
pub mod students;
pub mod teachers;
