//! # Registrar Auth
//!
//! Token types and JWT helpers for the Registrar API.
//!
//! - [`principal`]: the two kinds of account that can sign in
//! - [`claims`]: the payload carried by every bearer token
//! - [`jwt`]: token issuance and verification
//!
//! ```ignore
//! use registrar_auth::{PrincipalType, create_access_token, verify_token};
//!
//! let token = create_access_token(student_id, PrincipalType::Student, &jwt_config)?;
//! let claims = verify_token(&token, &jwt_config)?;
//! assert_eq!(claims.user_type, PrincipalType::Student);
//! ```

pub mod claims;
pub mod jwt;
pub mod principal;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
pub use principal::PrincipalType;
