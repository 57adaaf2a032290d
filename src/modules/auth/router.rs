use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{login_student, login_teacher, register_student, register_teacher};

pub fn init_student_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_student))
        .route("/login", post(login_student))
}

pub fn init_teacher_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_teacher))
        .route("/login", post(login_teacher))
}
