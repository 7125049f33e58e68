//! Session cookie authentication.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::api::pipeline::{Exchange, Handler, HandlerResult, Middleware};
use crate::application::services::SessionService;
use crate::error::AppError;
use crate::utils::cookie::{SESSION_COOKIE, find_cookie};

pub const NO_COOKIE: &str = "no authentication cookie provided";
pub const MUST_AUTHENTICATE: &str = "must be authenticated";
pub const COOKIE_EXPIRED: &str = "cookie expired";

/// Verifies the session cookie and attaches the principal.
///
/// A missing cookie, a cookie past its `Expires` attribute, and a token that
/// fails verification each produce their own message.
pub struct Authenticate {
    sessions: Arc<SessionService>,
}

impl Authenticate {
    pub fn new(sessions: Arc<SessionService>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl<P: Send + 'static> Middleware<P> for Authenticate {
    async fn handle(&self, exchange: &mut Exchange<P>, next: &dyn Handler<P>) -> HandlerResult {
        let cookie = find_cookie(&exchange.cookies(), SESSION_COOKIE)
            .ok_or_else(|| AppError::unauthorized(NO_COOKIE))?;

        match cookie.expires_at() {
            Ok(Some(expires)) if expires <= Utc::now() => {
                return Err(AppError::unauthorized(COOKIE_EXPIRED));
            }
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "Rejecting session cookie");
                return Err(AppError::unauthorized(MUST_AUTHENTICATE));
            }
        }

        if cookie.value.is_empty() {
            return Err(AppError::unauthorized(MUST_AUTHENTICATE));
        }

        let principal = self.sessions.verify(&cookie.value)?;
        exchange.set_principal(principal);

        next.call(exchange).await
    }
}
