use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_enrollment, delete_enrollment, get_enrollment, get_enrollments,
    get_student_enrollments, update_enrollment,
};

pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_enrollments).post(create_enrollment))
        .route("/{student_id}", get(get_student_enrollments))
        .route(
            "/entry/{id}",
            get(get_enrollment)
                .put(update_enrollment)
                .delete(delete_enrollment),
        )
}
