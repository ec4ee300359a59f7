//! Server configuration from environment variables.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use governor::{Quota, RateLimiter};

/// Default CORS origins when `ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Request bodies above this size are rejected (notes are small).
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated CORS origin whitelist.
    pub allowed_origins: String,
    pub rate_limit_enabled: bool,
    /// Requests allowed per period.
    pub rate_limit_requests: u32,
    pub rate_limit_period_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.to_string(),
            rate_limit_enabled: true,
            rate_limit_requests: 30,
            rate_limit_period_secs: 60,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything missing or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT").unwrap_or(defaults.port),
            allowed_origins: std::env::var("ALLOWED_ORIGINS").unwrap_or(defaults.allowed_origins),
            rate_limit_enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.rate_limit_enabled),
            rate_limit_requests: env_parse("RATE_LIMIT_REQUESTS")
                .unwrap_or(defaults.rate_limit_requests),
            rate_limit_period_secs: env_parse("RATE_LIMIT_PERIOD_SECS")
                .unwrap_or(defaults.rate_limit_period_secs),
            body_limit_bytes: env_parse("BODY_LIMIT_BYTES").unwrap_or(defaults.body_limit_bytes),
        }
    }

    /// Listen address as `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the global rate limiter, or `None` when disabled or the quota
    /// is zero.
    pub fn rate_limiter(&self) -> Option<Arc<GlobalRateLimiter>> {
        if !self.rate_limit_enabled {
            return None;
        }
        let burst = NonZeroU32::new(self.rate_limit_requests)?;
        let quota = Quota::with_period(Duration::from_secs(self.rate_limit_period_secs.max(1)))?
            .allow_burst(burst);
        Some(Arc::new(RateLimiter::direct(quota)))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Parse a comma-separated CORS origin list.
///
/// Invalid entries are logged and skipped; an empty list falls back to
/// [`DEFAULT_ALLOWED_ORIGINS`].
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    let origins: Vec<HeaderValue> = raw
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if origins.is_empty() {
        return vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGINS)];
    }
    origins
}
