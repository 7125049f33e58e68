//! Alias redirect handler.

use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::api::dto::RedirectQuery;
use crate::api::pipeline::{Exchange, Handler, HandlerResult};
use crate::application::services::LinkService;
use crate::error::AppError;

pub const UNREDIRECTABLE: &str = "unable to redirect to the stored url";

/// Resolves `?alias=` and answers with `307 Temporary Redirect`, so clients
/// never cache the mapping.
pub struct RedirectAlias {
    links: Arc<LinkService>,
}

impl RedirectAlias {
    pub fn new(links: Arc<LinkService>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl Handler<()> for RedirectAlias {
    async fn call(&self, exchange: &mut Exchange<()>) -> HandlerResult {
        let alias = exchange
            .query::<RedirectQuery>()?
            .alias
            .filter(|a| !a.is_empty())
            .ok_or_else(|| AppError::bad_request("alias must be provided"))?;

        let target = self.links.resolve_redirect(&alias).await?;

        let location = HeaderValue::try_from(target).map_err(|e| {
            tracing::error!(alias = %alias, "Stored url is not a valid Location header: {}", e);
            AppError::internal(UNREDIRECTABLE)
        })?;

        Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
    }
}
