use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use uuid::Uuid;

use registrar_auth::{Claims, PrincipalType, verify_token};
use registrar_core::AppError;

use crate::state::AppState;

/// Extractor that validates the bearer token and provides its claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn principal_type(&self) -> PrincipalType {
        self.0.user_type
    }

    pub fn principal_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid principal ID in token")))
    }

    pub fn is_teacher(&self) -> bool {
        self.principal_type() == PrincipalType::Teacher
    }

    pub fn is_student(&self) -> bool {
        self.principal_type() == PrincipalType::Student
    }

    /// True if the token belongs to exactly this principal.
    pub fn is_principal(&self, principal_type: PrincipalType, id: Uuid) -> bool {
        self.principal_type() == principal_type
            && self.principal_id().map(|own| own == id).unwrap_or(false)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AppError::unauthorized(anyhow!("Missing authorization header"))
                    } else {
                        AppError::unauthorized(anyhow!("Invalid authorization header format"))
                    }
                })?;

        let claims = verify_token(bearer.token(), &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Declares an extractor that accepts only tokens of one principal type.
#[macro_export]
macro_rules! require_principal {
    ($name:ident, $principal:expr, $label:literal) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = registrar_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;

                if auth_user.principal_type() != $principal {
                    return Err(registrar_core::AppError::forbidden(anyhow::anyhow!(
                        "Access denied. {} account required",
                        $label
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

require_principal!(RequireTeacher, PrincipalType::Teacher, "Teacher");
require_principal!(RequireStudent, PrincipalType::Student, "Student");
