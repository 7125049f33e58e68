//! Top-level router.
//!
//! # Route Structure
//!
//! - `/url/*`  - link creation, lookup, listing, deletion and redirect
//! - `/user*`  - sign-in, profile, account deletion, logout
//!
//! Each route runs its own pipeline (see [`crate::api::routes`]). Unknown
//! paths and wrong methods get the same error body the pipelines render.
//!
//! # Middleware
//!
//! - **Tracing** - request spans with latency, applied to the whole router
//! - **Path normalization** - trailing slash handling, applied in [`crate::server`]

use axum::Router;

use crate::api::handlers::fallback;
use crate::api::middleware::tracing;
use crate::api::routes::{url_routes, user_routes};
use crate::error::AppError;
use crate::state::AppState;

/// Builds the application router.
///
/// # Errors
///
/// Fails if the client key in `state` cannot be used to build the client key
/// layer.
pub fn app_router(state: AppState) -> Result<Router, AppError> {
    let router = Router::new()
        .merge(url_routes(&state)?)
        .merge(user_routes(&state)?)
        .fallback(fallback::not_found)
        .method_not_allowed_fallback(fallback::method_not_allowed)
        .layer(tracing::layer());

    Ok(router)
}
