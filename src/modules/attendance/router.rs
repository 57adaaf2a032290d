use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{get_course_attendance, get_student_attendance, record_attendance};

pub fn init_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_attendance))
        .route("/student/{student_id}", get(get_student_attendance))
        .route("/course/{course_id}", get(get_course_attendance))
}
