//! Bearer token issuance and verification (HS256).

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use registrar_config::JwtConfig;
use registrar_core::AppError;

use crate::claims::Claims;
use crate::principal::PrincipalType;

/// Issues a signed token for `principal_id` that expires after
/// `jwt_config.token_expiry` seconds.
pub fn create_access_token(
    principal_id: Uuid,
    principal_type: PrincipalType,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.token_expiry as usize;

    let claims = Claims {
        sub: principal_id.to_string(),
        user_type: principal_type,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry and returns the embedded claims.
///
/// Every failure maps to 401 with the same message so callers cannot
/// distinguish a forged token from an expired one.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(anyhow!("Invalid or expired token")))
}
