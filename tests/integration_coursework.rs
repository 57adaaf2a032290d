#![cfg(feature = "db-tests")]

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use common::{
    body_json, create_test_course, create_test_student, create_test_teacher, get_request,
    json_request, setup_test_app,
};

#[sqlx::test(migrations = "./migrations")]
async fn test_student_self_enrollment(pool: PgPool) {
    let teacher = create_test_teacher(&pool).await;
    let student = create_test_student(&pool).await;
    let course_id = create_test_course(&pool, "CS101", Some(teacher.id), None).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/enrollment",
            &json!({ "courseId": course_id, "semester": "Fall", "year": 2025 }),
            Some(&student.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["studentId"], student.id.to_string());
    assert_eq!(body["courseId"], course_id.to_string());
    assert!(body["grade"].is_null());

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(get_request(
            &format!("/api/enrollment/{}", student.id),
            Some(&student.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let enrollments = body.as_array().unwrap();
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0]["course"]["code"], "CS101");
    assert_eq!(enrollments[0]["course"]["credits"], 3);

    // Students only see their own rows in the flat listing.
    let other = create_test_student(&pool).await;
    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request("/api/enrollment", Some(&other.token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_enrolls_and_grades_student(pool: PgPool) {
    let teacher = create_test_teacher(&pool).await;
    let student = create_test_student(&pool).await;
    let course_id = create_test_course(&pool, "MATH201", Some(teacher.id), None).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/enrollment",
            &json!({
                "studentId": student.id,
                "courseId": course_id,
                "semester": "Spring",
                "year": 2025
            }),
            Some(&teacher.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let enrollment_id = body["id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/enrollment/entry/{}", enrollment_id),
            &json!({ "grade": "A" }),
            Some(&teacher.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["grade"], "A");
    assert_eq!(body["semester"], "Spring");

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request(
            &format!("/api/enrollment/entry/{}", enrollment_id),
            Some(&student.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_enrollment_unknown_course(pool: PgPool) {
    let student = create_test_student(&pool).await;

    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/enrollment",
            &json!({ "courseId": Uuid::new_v4(), "semester": "Fall", "year": 2025 }),
            Some(&student.token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Course not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_attendance_is_upserted(pool: PgPool) {
    let teacher = create_test_teacher(&pool).await;
    let student = create_test_student(&pool).await;
    let course_id = create_test_course(&pool, "ENG101", Some(teacher.id), None).await;

    for status in ["Absent", "Late"] {
        let app = setup_test_app(pool.clone());
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/attendance",
                &json!({
                    "studentId": student.id,
                    "courseId": course_id,
                    "attendanceDate": "2025-03-14",
                    "status": status
                }),
                Some(&teacher.token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], status);
    }

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(get_request(
            &format!("/api/attendance/student/{}", student.id),
            Some(&student.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "Late");
    assert_eq!(records[0]["attendanceDate"], "2025-03-14");

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request(
            &format!("/api/attendance/course/{}", course_id),
            Some(&teacher.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_instructor_records_attendance(pool: PgPool) {
    let instructor = create_test_teacher(&pool).await;
    let other = create_test_teacher(&pool).await;
    let student = create_test_student(&pool).await;
    let course_id = create_test_course(&pool, "ART100", Some(instructor.id), None).await;

    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/attendance",
            &json!({
                "studentId": student.id,
                "courseId": course_id,
                "attendanceDate": "2025-03-14",
                "status": "Present"
            }),
            Some(&other.token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Only the course's instructor can record attendance");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_room_lifecycle(pool: PgPool) {
    let teacher = create_test_teacher(&pool).await;
    let student = create_test_student(&pool).await;
    let course_id = create_test_course(&pool, "CS301", Some(teacher.id), None).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/course-room",
            &json!({ "courseId": course_id, "roomName": "Systems Lab" }),
            Some(&teacher.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["roomName"], "Systems Lab");
    assert_eq!(body["maxCapacity"], 50);
    assert_eq!(body["isActive"], true);
    assert_eq!(body["teacherId"], teacher.id.to_string());

    // One room per course.
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/course-room",
            &json!({ "courseId": course_id, "roomName": "Overflow" }),
            Some(&teacher.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "A room already exists for this course");

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(get_request("/api/course-room/teacher", Some(&teacher.token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["course"]["code"], "CS301");

    // Not enrolled yet, so the student sees no rooms.
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(get_request("/api/course-room/student", Some(&student.token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());

    sqlx::query(
        "INSERT INTO enrollments (student_id, course_id, semester, year) VALUES ($1, $2, 'Fall', 2025)",
    )
    .bind(student.id)
    .bind(course_id)
    .execute(&pool)
    .await
    .unwrap();

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request("/api/course-room/student", Some(&student.token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["roomName"], "Systems Lab");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_room_requires_course_ownership(pool: PgPool) {
    let instructor = create_test_teacher(&pool).await;
    let other = create_test_teacher(&pool).await;
    let course_id = create_test_course(&pool, "CS401", Some(instructor.id), None).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/course-room",
            &json!({ "courseId": course_id, "roomName": "Not Mine" }),
            Some(&other.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/course-room",
            &json!({ "courseId": course_id, "roomName": "Seminar", "maxCapacity": 20 }),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let room_id = body["id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/course-room/{}", room_id),
            &json!({ "isActive": false }),
            Some(&other.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "You can only manage your own course rooms");

    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/course-room/{}", room_id),
            &json!({ "isActive": false }),
            Some(&instructor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["isActive"], false);
    assert_eq!(body["maxCapacity"], 20);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_room_follows_reassigned_instructor(pool: PgPool) {
    let former = create_test_teacher(&pool).await;
    let successor = create_test_teacher(&pool).await;
    let course_id = create_test_course(&pool, "CS501", Some(former.id), None).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/course-room",
            &json!({ "courseId": course_id, "roomName": "Compilers" }),
            Some(&former.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let room_id = body["id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/course/{}", course_id),
            &json!({ "teacherId": successor.id }),
            Some(&former.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["teacherId"], successor.id.to_string());

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/course-room/{}", room_id),
            &json!({ "roomName": "Compilers II" }),
            Some(&successor.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["teacherId"], successor.id.to_string());
    assert_eq!(body["roomName"], "Compilers II");

    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/course-room/{}", room_id),
            &json!({ "isActive": false }),
            Some(&former.token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
