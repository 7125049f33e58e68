//! Rate-limit backends consulted by the rate gate middleware.
//!
//! - [`RedisRateLimiter`] - GCRA evaluated atomically inside Redis; shared
//!   across every instance of the service
//! - [`LocalRateLimiter`] - in-process GCRA via `governor`, used when no
//!   Redis is configured

pub mod local_limiter;
pub mod redis_limiter;

pub use local_limiter::LocalRateLimiter;
pub use redis_limiter::RedisRateLimiter;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Admission policy: `burst` requests at once, refilled at `rate` per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateLimit {
    pub rate: u32,
    pub burst: u32,
    pub period: Duration,
}

impl RateLimit {
    pub const fn new(rate: u32, burst: u32, period: Duration) -> Self {
        Self {
            rate,
            burst,
            period,
        }
    }

    /// Time needed to earn back one request.
    pub fn emission_interval(&self) -> Duration {
        self.period / self.rate.max(1)
    }
}

/// Outcome for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Wait before the next request can pass; zero when allowed.
    pub retry_after: Duration,
}

impl RateDecision {
    pub fn allow(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            retry_after: Duration::ZERO,
        }
    }

    pub fn deny(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            retry_after,
        }
    }
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limit backend error: {0}")]
    Backend(String),

    #[error("invalid rate limit: {0:?}")]
    InvalidLimit(RateLimit),
}

impl From<redis::RedisError> for RateLimitError {
    fn from(e: redis::RedisError) -> Self {
        RateLimitError::Backend(e.to_string())
    }
}

/// Shared counter deciding whether a keyed request is admitted.
///
/// Each call must be atomic per key.
#[async_trait]
pub trait RateLimitBackend: Send + Sync {
    async fn allow(&self, key: &str, limit: &RateLimit) -> Result<RateDecision, RateLimitError>;
}
