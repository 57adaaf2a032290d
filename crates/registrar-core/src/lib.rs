//! # Registrar Core
//!
//! Foundational types shared across the Registrar workspace:
//!
//! - [`errors`]: [`AppError`], the single error type every handler returns
//! - [`password`]: bcrypt password hashing and verification
//! - [`response`]: small response bodies reused by several modules

pub mod errors;
pub mod password;
pub mod response;

pub use errors::{AppError, ErrorResponse};
pub use password::{hash_password, verify_password};
pub use response::MessageResponse;
