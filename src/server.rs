//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, the rate limiter backend, service wiring and
//! the Axum server lifecycle.

use crate::application::services::{
    GoogleIdentityProvider, LinkService, SessionService, UserService,
};
use crate::config::Config;
use crate::infrastructure::persistence::{PgLinkRepository, PgUserRepository};
use crate::infrastructure::rate_limit::{LocalRateLimiter, RateLimitBackend, RedisRateLimiter};
use crate::routes::app_router;
use crate::state::{AppState, HttpSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

/// Picks the shared Redis limiter when configured, the process-local one
/// otherwise.
async fn rate_limiter(config: &Config) -> Result<Arc<dyn RateLimitBackend>> {
    match &config.redis_url {
        Some(redis_url) => {
            let limiter = RedisRateLimiter::connect(redis_url)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Rate limiter: Redis");
            Ok(Arc::new(limiter))
        }
        None => {
            tracing::warn!(
                "REDIS_URL not set, rate limits are tracked per process and not shared between instances"
            );
            Ok(Arc::new(LocalRateLimiter::new()))
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Rate limiter backend (Redis or local)
/// - Services and the identity provider
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if the database, Redis or the listener cannot be set up,
/// or the server fails at runtime.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let rate_limiter = rate_limiter(&config).await?;

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));

    let identity = GoogleIdentityProvider::new(config.google_client_id.clone())
        .context("Failed to build identity provider client")?;

    let state = AppState {
        links: Arc::new(LinkService::new(link_repository)),
        users: Arc::new(UserService::new(user_repository, Arc::new(identity))),
        sessions: Arc::new(SessionService::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.session_ttl_hours),
        )),
        rate_limiter,
        settings: HttpSettings {
            client_key: config.client_key.clone(),
            cors_origin: HeaderValue::from_str(&config.cors_allowed_origin)
                .context("CORS_ALLOWED_ORIGIN is not a valid header value")?,
            behind_proxy: config.behind_proxy,
            secure_cookies: config.secure_cookies(),
        },
    };

    let router = app_router(state).context("Failed to build router")?;
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
