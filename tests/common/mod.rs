#![allow(dead_code)]

use alias_shortener::application::services::{
    IdentityProfile, IdentityProvider, LinkService, SessionService, UserService,
};
use alias_shortener::domain::entities::{NewLink, NewUser, Principal};
use alias_shortener::domain::repositories::{LinkRepository, UserRepository};
use alias_shortener::error::AppError;
use alias_shortener::infrastructure::persistence::{
    InMemoryLinkRepository, InMemoryUserRepository,
};
use alias_shortener::infrastructure::rate_limit::LocalRateLimiter;
use alias_shortener::routes::app_router;
use alias_shortener::state::{AppState, HttpSettings};
use async_trait::async_trait;
use axum::http::HeaderValue;
use axum_test::{TestRequest, TestServer};
use sqlx::PgPool;
use std::sync::Arc;

pub const CLIENT_KEY: &str = "test-client-key";
pub const JWT_SECRET: &str = "test_secret_key_32_bytes_long!!";
pub const ORIGIN: &str = "http://localhost:3000";
pub const VALID_ID_TOKEN: &str = "valid-google-id-token";

/// Accepts [`VALID_ID_TOKEN`] and rejects everything else.
pub struct StubIdentityProvider;

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityProfile, AppError> {
        if id_token != VALID_ID_TOKEN {
            return Err(AppError::unauthorized("invalid id token"));
        }
        Ok(IdentityProfile {
            email: "ada@example.com".to_string(),
            email_verified: true,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            picture: "https://example.com/ada.png".to_string(),
        })
    }
}

/// Test server over in-memory repositories with handles to the stores.
pub struct TestApp {
    pub server: TestServer,
    pub links: Arc<InMemoryLinkRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub sessions: Arc<SessionService>,
}

impl TestApp {
    pub fn new() -> Self {
        let links = Arc::new(InMemoryLinkRepository::new());
        let users = Arc::new(InMemoryUserRepository::new(links.clone()));
        let sessions = Arc::new(SessionService::new(JWT_SECRET, chrono::Duration::hours(24)));

        let state = AppState {
            links: Arc::new(LinkService::new(links.clone())),
            users: Arc::new(UserService::new(
                users.clone(),
                Arc::new(StubIdentityProvider),
            )),
            sessions: sessions.clone(),
            rate_limiter: Arc::new(LocalRateLimiter::new()),
            settings: HttpSettings {
                client_key: CLIENT_KEY.to_string(),
                cors_origin: HeaderValue::from_static(ORIGIN),
                behind_proxy: false,
                secure_cookies: false,
            },
        };

        let app = app_router(state).unwrap();
        Self {
            server: TestServer::new(app).unwrap(),
            links,
            users,
            sessions,
        }
    }

    /// Stores a user and returns a session cookie header value for them.
    pub async fn signed_in_user(&self, email: &str) -> (i64, String) {
        let id = self
            .users
            .insert(NewUser {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: email.to_string(),
                picture: String::new(),
                verified: true,
            })
            .await
            .unwrap();

        let session = self.sessions.issue(Principal::new(id)).unwrap();
        (id, format!("_access_token={}", session.token))
    }

    pub async fn insert_link(&self, alias: &str, url: &str, owner_id: Option<i64>) -> i64 {
        self.links
            .insert(NewLink {
                owner_id,
                original_url: url.to_string(),
                alias: alias.to_string(),
            })
            .await
            .unwrap()
    }
}

/// Adds the client credential every route requires.
pub fn authorized(request: TestRequest) -> TestRequest {
    request.add_header("authorization", format!("Bearer {CLIENT_KEY}"))
}

/// Adds the client credential and a session cookie.
pub fn signed_in(request: TestRequest, cookie: &str) -> TestRequest {
    authorized(request).add_header("cookie", cookie.to_string())
}

pub async fn insert_pg_user(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (first_name, last_name, email, picture, verified)
         VALUES ('Test', 'User', $1, '', TRUE) RETURNING id",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_pg_link(pool: &PgPool, alias: &str, url: &str, owner_id: Option<i64>) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (owner_id, original_url, alias) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(owner_id)
    .bind(url)
    .bind(alias)
    .fetch_one(pool)
    .await
    .unwrap()
}
