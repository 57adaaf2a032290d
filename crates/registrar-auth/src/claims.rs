//! JWT claim structure for bearer tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::principal::PrincipalType;

/// Claims embedded in every bearer token.
///
/// Handlers authorize from these alone: `sub` names the principal and
/// `user_type` says which table it lives in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Principal ID (subject claim)
    pub sub: String,
    #[serde(rename = "userType")]
    pub user_type: PrincipalType,
    /// Expiration, Unix seconds
    pub exp: usize,
    /// Issued-at, Unix seconds
    pub iat: usize,
}
