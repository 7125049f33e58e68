use axum::http::HeaderValue;
use std::sync::Arc;

use crate::application::services::{LinkService, SessionService, UserService};
use crate::infrastructure::rate_limit::RateLimitBackend;

/// Request-independent settings the middlewares are built from.
#[derive(Clone)]
pub struct HttpSettings {
    pub client_key: String,
    pub cors_origin: HeaderValue,
    pub behind_proxy: bool,
    pub secure_cookies: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub links: Arc<LinkService>,
    pub users: Arc<UserService>,
    pub sessions: Arc<SessionService>,
    pub rate_limiter: Arc<dyn RateLimitBackend>,
    pub settings: HttpSettings,
}
