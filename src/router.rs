use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use registrar_config::AuthGovernorConfig;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::attendance::init_attendance_router;
use crate::modules::auth::{init_student_auth_router, init_teacher_auth_router};
use crate::modules::course_rooms::init_course_rooms_router;
use crate::modules::courses::init_courses_router;
use crate::modules::departments::init_departments_router;
use crate::modules::enrollments::init_enrollments_router;
use crate::modules::students::init_students_router;
use crate::modules::teachers::init_teachers_router;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Puts the register/login routes behind the per-IP limiter.
fn rate_limited(
    router: Router<AppState>,
    config: Option<&Arc<AuthGovernorConfig>>,
) -> Router<AppState> {
    match config {
        Some(config) => router.layer(GovernorLayer::new(Arc::clone(config))),
        None => router,
    }
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let auth_limit = state.rate_limit_config.auth_governor_config().map(Arc::new);
    if auth_limit.is_none() {
        warn!("Rate limiter configuration rejected; auth routes are not rate limited");
    }

    Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest(
                    "/student",
                    rate_limited(init_student_auth_router(), auth_limit.as_ref())
                        .merge(init_students_router()),
                )
                .nest(
                    "/teacher",
                    rate_limited(init_teacher_auth_router(), auth_limit.as_ref())
                        .merge(init_teachers_router()),
                )
                .nest("/course", init_courses_router())
                .nest("/department", init_departments_router())
                .nest("/enrollment", init_enrollments_router())
                .nest("/attendance", init_attendance_router())
                .nest("/course-room", init_course_rooms_router()),
        )
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
