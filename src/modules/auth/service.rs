use anyhow::anyhow;
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use registrar_auth::{PrincipalType, create_access_token};
use registrar_config::JwtConfig;
use registrar_core::{AppError, hash_password, verify_password};

use crate::metrics::{track_jwt_issued, track_login_failure, track_login_success, track_registration};

use super::model::{AuthenticatedUser, LoginRequest, LoginResponse, RegisterRequest};

#[derive(FromRow)]
struct StoredCredentials {
    id: Uuid,
    username: String,
    email: String,
    password: String,
}

pub struct AuthService;

impl AuthService {
    /// Creates a principal of `principal_type` with a bcrypt-hashed password.
    ///
    /// Username and email are unique per principal type; a student and a
    /// teacher may share either.
    #[instrument(skip(db, dto), fields(principal = %principal_type, username = %dto.username))]
    pub async fn register(
        db: &PgPool,
        principal_type: PrincipalType,
        dto: RegisterRequest,
    ) -> Result<Uuid, AppError> {
        if dto.password != dto.confirm_password {
            return Err(AppError::validation(anyhow!("Passwords do not match")));
        }

        let exists = sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE username = $1 OR email = $2)",
            principal_type.table()
        ))
        .bind(&dto.username)
        .bind(&dto.email)
        .fetch_one(db)
        .await?;

        if exists {
            return Err(AppError::conflict(anyhow!("Username or email already exists")));
        }

        let hashed_password = hash_password(&dto.password)?;

        let insert = match principal_type {
            PrincipalType::Student => {
                "INSERT INTO students (username, email, password, status)
                 VALUES ($1, $2, $3, 'active')
                 RETURNING id"
            }
            PrincipalType::Teacher => {
                "INSERT INTO teachers (username, email, password)
                 VALUES ($1, $2, $3)
                 RETURNING id"
            }
        };

        let id = sqlx::query_scalar::<_, Uuid>(insert)
            .bind(&dto.username)
            .bind(&dto.email)
            .bind(&hashed_password)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::conflict(anyhow!("Username or email already exists"));
                }
                AppError::from(e)
            })?;

        track_registration(principal_type.as_str());
        info!(principal_id = %id, "Principal registered");

        Ok(id)
    }

    #[instrument(skip(db, dto, jwt_config), fields(principal = %principal_type, username = %dto.username))]
    pub async fn login(
        db: &PgPool,
        principal_type: PrincipalType,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let stored = sqlx::query_as::<_, StoredCredentials>(&format!(
            "SELECT id, username, email, password FROM {} WHERE username = $1",
            principal_type.table()
        ))
        .bind(&dto.username)
        .fetch_optional(db)
        .await?;

        // Unknown username and wrong password share one response.
        let Some(stored) = stored else {
            track_login_failure(principal_type.as_str());
            warn!("Login failed: unknown username");
            return Err(AppError::unauthorized(anyhow!("Invalid credentials")));
        };

        if !verify_password(&dto.password, &stored.password)? {
            track_login_failure(principal_type.as_str());
            warn!(principal_id = %stored.id, "Login failed: wrong password");
            return Err(AppError::unauthorized(anyhow!("Invalid credentials")));
        }

        let token = create_access_token(stored.id, principal_type, jwt_config)?;
        track_jwt_issued();
        track_login_success(principal_type.as_str());

        Ok(LoginResponse {
            token,
            user: AuthenticatedUser {
                id: stored.id,
                username: stored.username,
                email: stored.email,
                user_type: principal_type,
            },
        })
    }
}
