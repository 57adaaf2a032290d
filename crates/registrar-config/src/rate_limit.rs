//! Rate limiting for the credential endpoints.
//!
//! Register and login are the only unauthenticated write paths, so they are
//! the ones guarded. Limits come from the environment:
//!
//! - `RATE_LIMIT_AUTH_PER_SECOND`: seconds between replenished tokens (default: 2)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: bucket size (default: 10)
//!
//! Clients are keyed by IP, taken from `X-Forwarded-For`, `X-Real-Ip` or
//! `Forwarded` when present and from the socket peer address otherwise.

use governor::middleware::NoOpMiddleware;
use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

pub type AuthGovernorConfig = GovernorConfig<SmartIpKeyExtractor, NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Interval, in seconds, at which one request token is replenished.
    pub auth_per_second: u64,

    /// Maximum number of tokens a client can accumulate.
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_per_second: 2,
            auth_burst_size: 10,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            auth_per_second: std::env::var("RATE_LIMIT_AUTH_PER_SECOND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.auth_per_second),
            auth_burst_size: std::env::var("RATE_LIMIT_AUTH_BURST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.auth_burst_size),
        }
    }

    /// Builds the governor config for the register/login routes.
    ///
    /// Zero values are clamped to one, so this only returns `None` if the
    /// builder itself rejects the configuration.
    #[must_use]
    pub fn auth_governor_config(&self) -> Option<AuthGovernorConfig> {
        GovernorConfigBuilder::default()
            .per_second(self.auth_per_second.max(1))
            .burst_size(self.auth_burst_size.max(1))
            .key_extractor(SmartIpKeyExtractor)
            .finish()
    }
}
