#![cfg(feature = "db-tests")]

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{body_json, get_request, json_request, setup_test_app, unique_username};

fn register_body(username: &str, password: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": password,
        "confirmPassword": password
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_register_and_login(pool: PgPool) {
    let username = unique_username("alice");

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/student/register",
            &register_body(&username, "pw123"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Student registered successfully");

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/student/login",
            &json!({ "username": username, "password": "pw123" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["username"], username.as_str());
    assert_eq!(body["user"]["userType"], "student");

    // The issued token opens protected routes.
    let token = body["token"].as_str().unwrap().to_string();
    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request("/api/course", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let username = unique_username("bob");

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/teacher/register",
            &register_body(&username, "pw1234"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/teacher/login",
            &json!({ "username": username, "password": "wrong-password" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid credentials");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_unknown_user(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/student/login",
            &json!({ "username": "nobody", "password": "pw1234" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid credentials");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_registration_rejected(pool: PgPool) {
    let username = unique_username("carol");

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/student/register",
            &register_body(&username, "pw1234"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/student/register",
            &register_body(&username, "pw1234"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Username or email already exists");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_credential_namespaces_are_separate(pool: PgPool) {
    let username = unique_username("dana");

    for uri in ["/api/student/register", "/api/teacher/register"] {
        let app = setup_test_app(pool.clone());
        let response = app
            .oneshot(json_request("POST", uri, &register_body(&username, "pw1234"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED, "POST {}", uri);
    }

    // Login resolves against the teacher table.
    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/teacher/login",
            &json!({ "username": username, "password": "pw1234" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["userType"], "teacher");
}
