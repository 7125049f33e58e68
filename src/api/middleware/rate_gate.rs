//! Per-route admission through the shared rate-limit backend.

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, header};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::api::pipeline::{Exchange, Handler, HandlerResult, Middleware};
use crate::error::AppError;
use crate::infrastructure::rate_limit::{RateLimit, RateLimitBackend};
use crate::utils::client_ip::client_ip;

pub static RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");

/// Redirect and listing.
pub const BROWSE: RateLimit = RateLimit::new(1000, 500, Duration::from_secs(120));
/// Single reads and deletes, profile reads and account deletion.
pub const STANDARD: RateLimit = RateLimit::new(100, 50, Duration::from_secs(120));
/// Creation, alias checks, sign-in, logout and batch deletion.
pub const STRICT: RateLimit = RateLimit::new(10, 5, Duration::from_secs(120));

/// Builds the backend key: `rate_limit:{ip}:{uri}:{host}:{method}`.
pub fn rate_limit_key(ip: &str, request_uri: &str, host: &str, method: &str) -> String {
    format!("rate_limit:{ip}:{request_uri}:{host}:{method}")
}

/// Seconds to advertise in `Retry-After`, rounded up and at least one.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

pub struct RateGate {
    backend: Arc<dyn RateLimitBackend>,
    limit: RateLimit,
    behind_proxy: bool,
}

impl RateGate {
    pub fn new(backend: Arc<dyn RateLimitBackend>, limit: RateLimit, behind_proxy: bool) -> Self {
        Self {
            backend,
            limit,
            behind_proxy,
        }
    }
}

#[async_trait]
impl<P: Send + 'static> Middleware<P> for RateGate {
    async fn handle(&self, exchange: &mut Exchange<P>, next: &dyn Handler<P>) -> HandlerResult {
        let ip = client_ip(&exchange.headers, exchange.peer_addr, self.behind_proxy);
        let key = rate_limit_key(
            &ip,
            exchange.request_uri(),
            exchange.host(),
            exchange.method.as_str(),
        );

        let decision = self.backend.allow(&key, &self.limit).await.map_err(|e| {
            error!(error = %e, "Rate limit backend failed");
            AppError::internal("internal server error")
        })?;

        let headers = exchange.response_headers_mut();
        headers.insert(
            RATE_LIMIT_REMAINING.clone(),
            HeaderValue::from(decision.remaining),
        );

        if !decision.allowed {
            headers.insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after_secs(decision.retry_after)),
            );
            counter!("rate_limited_requests_total").increment(1);
            warn!(ip = %ip, path = %exchange.path(), "Rate limit exceeded");
            return Err(AppError::too_many_requests("too many requests"));
        }

        next.call(exchange).await
    }
}
