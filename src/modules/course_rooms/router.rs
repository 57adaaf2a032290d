use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_course_room, delete_course_room, get_course_room, get_course_rooms,
    get_student_rooms, get_teacher_rooms, update_course_room,
};

pub fn init_course_rooms_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_course_rooms).post(create_course_room))
        .route("/teacher", get(get_teacher_rooms))
        .route("/student", get(get_student_rooms))
        .route(
            "/{id}",
            get(get_course_room)
                .put(update_course_room)
                .delete(delete_course_room),
        )
}
