//! Terminal handlers for the `/url` routes.

use async_trait::async_trait;
use axum::http::StatusCode;
use std::sync::Arc;

use crate::api::dto::{
    CheckAliasPayload, CreateUrlPayload, DeleteUrlsQuery, DeletedResponse, LinkListResponse,
    LinkResponse, ListUrlsQuery,
};
use crate::api::pipeline::{Exchange, Handler, HandlerResult, json_response};
use crate::application::services::LinkService;
use crate::error::AppError;

fn url_id<P>(exchange: &Exchange<P>) -> Result<i64, AppError> {
    exchange
        .path_param("urlId")?
        .parse::<i64>()
        .map_err(|_| AppError::bad_request("invalid url id"))
}

/// Creates a link. Serves both the authenticated route (link owned by the
/// principal) and the guest route (no owner).
pub struct CreateUrl {
    links: Arc<LinkService>,
}

impl CreateUrl {
    pub fn new(links: Arc<LinkService>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl Handler<CreateUrlPayload> for CreateUrl {
    async fn call(&self, exchange: &mut Exchange<CreateUrlPayload>) -> HandlerResult {
        let payload = exchange.take_payload()?;
        let link = self
            .links
            .create_link(
                payload.original_url,
                payload.alias,
                exchange.optional_principal(),
            )
            .await?;

        Ok(json_response(StatusCode::CREATED, LinkResponse::from(link)))
    }
}

pub struct CheckAlias {
    links: Arc<LinkService>,
}

impl CheckAlias {
    pub fn new(links: Arc<LinkService>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl Handler<CheckAliasPayload> for CheckAlias {
    async fn call(&self, exchange: &mut Exchange<CheckAliasPayload>) -> HandlerResult {
        let payload = exchange.take_payload()?;
        self.links.check_alias(&payload.alias).await?;

        Ok(json_response(StatusCode::OK, ()))
    }
}

pub struct GetUrl {
    links: Arc<LinkService>,
}

impl GetUrl {
    pub fn new(links: Arc<LinkService>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl Handler<()> for GetUrl {
    async fn call(&self, exchange: &mut Exchange<()>) -> HandlerResult {
        let id = url_id(exchange)?;
        let link = self.links.get_link(id, exchange.principal()?).await?;

        Ok(json_response(StatusCode::OK, LinkResponse::from(link)))
    }
}

pub struct ListUrls {
    links: Arc<LinkService>,
}

impl ListUrls {
    pub fn new(links: Arc<LinkService>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl Handler<()> for ListUrls {
    async fn call(&self, exchange: &mut Exchange<()>) -> HandlerResult {
        let filter = exchange.query::<ListUrlsQuery>()?.into_filter();
        let page = self.links.list_links(exchange.principal()?, filter).await?;

        Ok(json_response(StatusCode::OK, LinkListResponse::from(page)))
    }
}

pub struct DeleteUrl {
    links: Arc<LinkService>,
}

impl DeleteUrl {
    pub fn new(links: Arc<LinkService>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl Handler<()> for DeleteUrl {
    async fn call(&self, exchange: &mut Exchange<()>) -> HandlerResult {
        let id = url_id(exchange)?;
        self.links.delete_link(id, exchange.principal()?).await?;

        Ok(json_response(StatusCode::OK, ()))
    }
}

pub struct DeleteUrls {
    links: Arc<LinkService>,
}

impl DeleteUrls {
    pub fn new(links: Arc<LinkService>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl Handler<()> for DeleteUrls {
    async fn call(&self, exchange: &mut Exchange<()>) -> HandlerResult {
        let ids = exchange.query::<DeleteUrlsQuery>()?.ids()?;
        let deleted = self.links.delete_links(&ids, exchange.principal()?).await?;

        Ok(json_response(StatusCode::OK, DeletedResponse { deleted }))
    }
}
