//! Router-level checks that are settled before any query runs: routing,
//! authentication, principal checks, body validation and rate limiting.
//! The pool behind these apps is never connected.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use registrar::registrar_auth::PrincipalType;
use registrar::registrar_config::RateLimitConfig;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::{
    body_json, empty_request, get_request, json_request, setup_store_free_app,
    setup_store_free_app_with_rate_limit, token_for,
};

#[tokio::test]
async fn test_health_check() {
    let app = setup_store_free_app();

    let response = app.oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = setup_store_free_app();

    let response = app
        .oneshot(get_request("/api-docs/openapi.json", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/api/course-room"].is_object());
    assert!(body["paths"]["/api/attendance"].is_object());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = setup_store_free_app();

    let response = app
        .oneshot(get_request("/api/does-not-exist", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let id = Uuid::new_v4();
    let uris = [
        "/api/student".to_string(),
        "/api/teacher".to_string(),
        "/api/course".to_string(),
        "/api/department".to_string(),
        "/api/enrollment".to_string(),
        "/api/course-room".to_string(),
        "/api/course-room/teacher".to_string(),
        "/api/course-room/student".to_string(),
        format!("/api/attendance/student/{}", id),
        format!("/api/attendance/course/{}", id),
    ];

    for uri in uris {
        let app = setup_store_free_app();
        let response = app.oneshot(get_request(&uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "GET {}", uri);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Missing authorization header");
    }
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = setup_store_free_app();

    let response = app
        .oneshot(get_request("/api/course-room", Some("not-a-jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_non_bearer_authorization_rejected() {
    let app = setup_store_free_app();

    let request = Request::builder()
        .uri("/api/course")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid authorization header format");
}

#[tokio::test]
async fn test_student_cannot_create_department() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Student, Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/department",
            &json!({ "name": "Physics" }),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Access denied. Teacher account required");
}

#[tokio::test]
async fn test_student_cannot_create_course() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Student, Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/course",
            &json!({ "name": "Mechanics", "code": "PHY101", "credits": 3 }),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let app = setup_store_free_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/student/register",
            &json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "pw1234",
                "confirmPassword": "pw9999"
            }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Passwords do not match");
}

#[tokio::test]
async fn test_register_missing_field() {
    let app = setup_store_free_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/teacher/register",
            &json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "pw1234"
            }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "confirmPassword is required");
}

#[tokio::test]
async fn test_register_short_username() {
    let app = setup_store_free_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/student/register",
            &json!({
                "username": "al",
                "email": "al@example.com",
                "password": "pw1234",
                "confirmPassword": "pw1234"
            }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Username must be between 3 and 50 characters");
}

#[tokio::test]
async fn test_login_malformed_json() {
    let app = setup_store_free_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/student/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.10")
        .body(Body::from("{\"username\": \"alice\""))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_field_type() {
    let app = setup_store_free_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/teacher/login",
            &json!({ "username": 42, "password": "pw1234" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid field type in request");
}

#[tokio::test]
async fn test_teacher_cannot_list_student_rooms() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Teacher, Uuid::new_v4());

    let response = app
        .oneshot(get_request("/api/course-room/student", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Access denied. Student account required");
}

#[tokio::test]
async fn test_student_cannot_list_teacher_rooms() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Student, Uuid::new_v4());

    let response = app
        .oneshot(get_request("/api/course-room/teacher", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_cannot_create_course_room() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Student, Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/course-room",
            &json!({ "courseId": Uuid::new_v4(), "roomName": "Lab" }),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_cannot_enroll_someone_else() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Student, Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/enrollment",
            &json!({
                "studentId": Uuid::new_v4(),
                "courseId": Uuid::new_v4(),
                "semester": "Fall",
                "year": 2025
            }),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Students can only enroll themselves");
}

#[tokio::test]
async fn test_teacher_enrollment_requires_student_id() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Teacher, Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/enrollment",
            &json!({ "courseId": Uuid::new_v4(), "semester": "Fall", "year": 2025 }),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "studentId is required");
}

#[tokio::test]
async fn test_enrollment_year_out_of_range() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Student, Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/enrollment",
            &json!({ "courseId": Uuid::new_v4(), "semester": "Fall", "year": 1800 }),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Year must be between 1900 and 2100");
}

#[tokio::test]
async fn test_student_cannot_view_other_student_records() {
    let token = token_for(PrincipalType::Student, Uuid::new_v4());
    let other = Uuid::new_v4();

    for uri in [
        format!("/api/enrollment/{}", other),
        format!("/api/attendance/student/{}", other),
    ] {
        let app = setup_store_free_app();
        let response = app.oneshot(get_request(&uri, Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "GET {}", uri);
    }
}

#[tokio::test]
async fn test_student_cannot_modify_enrollment_entries() {
    let token = token_for(PrincipalType::Student, Uuid::new_v4());
    let uri = format!("/api/enrollment/entry/{}", Uuid::new_v4());

    let app = setup_store_free_app();
    let response = app
        .oneshot(json_request("PUT", &uri, &json!({ "grade": "A" }), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = setup_store_free_app();
    let response = app
        .oneshot(empty_request("DELETE", &uri, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_cannot_record_attendance() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Student, Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/attendance",
            &json!({
                "studentId": Uuid::new_v4(),
                "courseId": Uuid::new_v4(),
                "attendanceDate": "2025-03-14",
                "status": "Present"
            }),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_cannot_view_course_attendance() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Student, Uuid::new_v4());

    let response = app
        .oneshot(get_request(
            &format!("/api/attendance/course/{}", Uuid::new_v4()),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_teacher_cannot_update_another_teacher() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Teacher, Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/teacher/{}", Uuid::new_v4()),
            &json!({ "designation": "Professor" }),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "You can only modify your own teacher record");
}

#[tokio::test]
async fn test_student_cannot_delete_teacher() {
    let app = setup_store_free_app();
    let teacher_id = Uuid::new_v4();
    let token = token_for(PrincipalType::Student, teacher_id);

    // Same UUID, wrong principal type.
    let response = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/teacher/{}", teacher_id),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_cannot_update_another_student() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Student, Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/student/{}", Uuid::new_v4()),
            &json!({ "firstName": "Mallory" }),
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_path_id_rejected() {
    let app = setup_store_free_app();
    let token = token_for(PrincipalType::Teacher, Uuid::new_v4());

    let response = app
        .oneshot(get_request("/api/course/not-a-uuid", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn strict_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        auth_per_second: 60,
        auth_burst_size: 1,
    }
}

fn login_request(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/student/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(r#"{"username": "", "password": ""}"#))
        .unwrap()
}

#[tokio::test]
async fn test_auth_rate_limit_exceeded() {
    let app = setup_store_free_app_with_rate_limit(strict_rate_limit());

    let first = app.clone().oneshot(login_request("198.51.100.1")).await.unwrap();
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    let second = app.oneshot(login_request("198.51.100.1")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_is_per_ip() {
    let app = setup_store_free_app_with_rate_limit(strict_rate_limit());

    let first = app.clone().oneshot(login_request("198.51.100.2")).await.unwrap();
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    let other_ip = app.clone().oneshot(login_request("198.51.100.3")).await.unwrap();
    assert_eq!(other_ip.status(), StatusCode::BAD_REQUEST);

    let repeat = app.oneshot(login_request("198.51.100.2")).await.unwrap();
    assert_eq!(repeat.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_does_not_cover_resource_routes() {
    let app = setup_store_free_app_with_rate_limit(strict_rate_limit());

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get_request("/api/course", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
