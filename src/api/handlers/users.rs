//! Terminal handlers for the `/user` routes.

use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use std::sync::Arc;

use crate::api::dto::{CreateUserPayload, UserResponse};
use crate::api::pipeline::{Exchange, Handler, HandlerResult, json_response};
use crate::application::services::{SessionService, UserService};
use crate::domain::entities::Principal;
use crate::error::AppError;
use crate::utils::cookie::{clear_session_cookie, session_cookie};

fn with_cookie(mut response: Response, cookie: String) -> HandlerResult {
    let value = HeaderValue::from_str(&cookie).map_err(|e| {
        tracing::error!(error = %e, "Session cookie is not a valid header value");
        AppError::internal("internal server error")
    })?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

/// Signs in through the identity provider and sets the session cookie.
pub struct SignIn {
    users: Arc<UserService>,
    sessions: Arc<SessionService>,
    secure_cookies: bool,
}

impl SignIn {
    pub fn new(users: Arc<UserService>, sessions: Arc<SessionService>, secure_cookies: bool) -> Self {
        Self {
            users,
            sessions,
            secure_cookies,
        }
    }
}

#[async_trait]
impl Handler<CreateUserPayload> for SignIn {
    async fn call(&self, exchange: &mut Exchange<CreateUserPayload>) -> HandlerResult {
        let payload = exchange.take_payload()?;
        let method = payload
            .sign_in_method()
            .ok_or_else(|| AppError::bad_request("invalid sign in method"))?;

        let user = self.users.sign_in(method, &payload.id_token).await?;
        let session = self.sessions.issue(Principal::new(user.id))?;

        with_cookie(
            json_response(StatusCode::CREATED, UserResponse::from(user)),
            session_cookie(&session.token, session.expires_at, self.secure_cookies),
        )
    }
}

pub struct GetUser {
    users: Arc<UserService>,
}

impl GetUser {
    pub fn new(users: Arc<UserService>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Handler<()> for GetUser {
    async fn call(&self, exchange: &mut Exchange<()>) -> HandlerResult {
        let user = self.users.get_user(exchange.principal()?).await?;
        Ok(json_response(StatusCode::OK, UserResponse::from(user)))
    }
}

/// Deletes the account with its links and drops the session cookie.
pub struct DeleteUser {
    users: Arc<UserService>,
    secure_cookies: bool,
}

impl DeleteUser {
    pub fn new(users: Arc<UserService>, secure_cookies: bool) -> Self {
        Self {
            users,
            secure_cookies,
        }
    }
}

#[async_trait]
impl Handler<()> for DeleteUser {
    async fn call(&self, exchange: &mut Exchange<()>) -> HandlerResult {
        self.users.delete_user(exchange.principal()?).await?;

        with_cookie(
            json_response(StatusCode::OK, ()),
            clear_session_cookie(self.secure_cookies),
        )
    }
}

pub struct Logout {
    secure_cookies: bool,
}

impl Logout {
    pub fn new(secure_cookies: bool) -> Self {
        Self { secure_cookies }
    }
}

#[async_trait]
impl Handler<()> for Logout {
    async fn call(&self, _exchange: &mut Exchange<()>) -> HandlerResult {
        with_cookie(
            json_response(StatusCode::OK, ()),
            clear_session_cookie(self.secure_cookies),
        )
    }
}
