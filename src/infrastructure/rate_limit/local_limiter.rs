//! In-process GCRA limiter built on `governor`.

use super::{RateDecision, RateLimit, RateLimitBackend, RateLimitError};
use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

type KeyedLimiter =
    RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock, StateInformationMiddleware>;

/// Keys tracked per limiter before stale entries are purged.
const RETAIN_THRESHOLD: usize = 10_000;

/// One keyed `governor` limiter per distinct [`RateLimit`].
///
/// State is per process; several instances of the service each admit their
/// own burst.
#[derive(Default)]
pub struct LocalRateLimiter {
    limiters: Mutex<HashMap<RateLimit, Arc<KeyedLimiter>>>,
}

impl LocalRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn limiter_for(&self, limit: &RateLimit) -> Result<Arc<KeyedLimiter>, RateLimitError> {
        let mut limiters = self
            .limiters
            .lock()
            .map_err(|_| RateLimitError::Backend("limiter registry poisoned".to_string()))?;

        if let Some(limiter) = limiters.get(limit) {
            return Ok(limiter.clone());
        }

        let burst = NonZeroU32::new(limit.burst).ok_or(RateLimitError::InvalidLimit(*limit))?;
        if limit.rate == 0 {
            return Err(RateLimitError::InvalidLimit(*limit));
        }
        let quota = Quota::with_period(limit.emission_interval())
            .ok_or(RateLimitError::InvalidLimit(*limit))?
            .allow_burst(burst);

        let limiter = Arc::new(RateLimiter::keyed(quota).with_middleware::<StateInformationMiddleware>());
        limiters.insert(*limit, limiter.clone());
        Ok(limiter)
    }
}

#[async_trait]
impl RateLimitBackend for LocalRateLimiter {
    async fn allow(&self, key: &str, limit: &RateLimit) -> Result<RateDecision, RateLimitError> {
        let limiter = self.limiter_for(limit)?;

        if limiter.len() > RETAIN_THRESHOLD {
            limiter.retain_recent();
        }

        match limiter.check_key(&key.to_string()) {
            Ok(snapshot) => Ok(RateDecision::allow(snapshot.remaining_burst_capacity())),
            Err(not_until) => Ok(RateDecision::deny(
                not_until.wait_time_from(DefaultClock::default().now()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const LIMIT: RateLimit = RateLimit::new(10, 5, Duration::from_secs(120));

    #[tokio::test]
    async fn test_remaining_decreases_until_denied() {
        let limiter = LocalRateLimiter::new();

        let mut seen = Vec::new();
        for _ in 0..5 {
            let decision = limiter.allow("k", &LIMIT).await.unwrap();
            assert!(decision.allowed);
            seen.push(decision.remaining);
        }
        assert_eq!(seen, vec![4, 3, 2, 1, 0]);

        let denied = limiter.allow("k", &LIMIT).await.unwrap();
        assert!(!denied.allowed);
        assert!(denied.retry_after > Duration::ZERO);
        assert!(denied.retry_after <= LIMIT.emission_interval());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = LocalRateLimiter::new();
        for _ in 0..5 {
            limiter.allow("a", &LIMIT).await.unwrap();
        }

        assert!(!limiter.allow("a", &LIMIT).await.unwrap().allowed);
        assert!(limiter.allow("b", &LIMIT).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_limits_are_independent() {
        let limiter = LocalRateLimiter::new();
        let wide = RateLimit::new(1000, 500, Duration::from_secs(120));
        for _ in 0..5 {
            limiter.allow("k", &LIMIT).await.unwrap();
        }

        let decision = limiter.allow("k", &wide).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 499);
    }

    #[tokio::test]
    async fn test_zero_burst_is_rejected() {
        let limiter = LocalRateLimiter::new();
        let invalid = RateLimit::new(10, 0, Duration::from_secs(1));

        assert!(matches!(
            limiter.allow("k", &invalid).await,
            Err(RateLimitError::InvalidLimit(_))
        ));
    }
}
