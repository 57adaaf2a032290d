//! # Registrar Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing secret and expiry
//! - [`cors`]: allowed browser origins
//! - [`rate_limit`]: limits for the register/login endpoints
//! - [`server`]: listen address
//!
//! Every `from_env` falls back to a development default when a variable is
//! unset or unparsable.

pub mod cors;
pub mod jwt;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use rate_limit::{AuthGovernorConfig, RateLimitConfig};
pub use server::ServerConfig;
