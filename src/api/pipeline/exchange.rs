//! Request-scoped state threaded through a composed pipeline.

use axum::body::Body;
use axum::extract::{ConnectInfo, Query, Request};
use axum::http::{HeaderMap, Method, Uri, header};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::SocketAddr;

use crate::domain::entities::Principal;
use crate::error::AppError;

/// One in-flight request as seen by middlewares and the terminal handler.
///
/// `P` is the decoded payload type of the route (`()` for routes without a
/// body). The payload and the principal start empty and are filled by the
/// layers that produce them.
pub struct Exchange<P> {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub peer_addr: Option<SocketAddr>,
    path_params: HashMap<String, String>,
    body: Option<Body>,
    principal: Option<Principal>,
    payload: Option<P>,
    response_headers: HeaderMap,
}

impl<P> Exchange<P> {
    pub fn new(request: Request, path_params: HashMap<String, String>) -> Self {
        let peer_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let (parts, body) = request.into_parts();

        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            peer_addr,
            path_params,
            body: Some(body),
            principal: None,
            payload: None,
            response_headers: HeaderMap::new(),
        }
    }

    /// Request path, used in error bodies and logs.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Path and query exactly as requested.
    pub fn request_uri(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| self.uri.path())
    }

    pub fn host(&self) -> &str {
        self.headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| self.uri.host())
            .unwrap_or_default()
    }

    /// All `Cookie` headers joined into one value.
    pub fn cookies(&self) -> String {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Takes the raw body. Only the first caller gets it.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    pub fn path_param(&self, name: &str) -> Result<&str, AppError> {
        self.path_params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AppError::bad_request(format!("{name} must be provided")))
    }

    /// Decodes the query string.
    pub fn query<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        Query::<T>::try_from_uri(&self.uri)
            .map(|Query(q)| q)
            .map_err(|_| AppError::bad_request("invalid query parameters"))
    }

    pub fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    /// The authenticated caller.
    ///
    /// # Errors
    ///
    /// [`AppError::Internal`] when the route was composed without an
    /// authentication layer.
    pub fn principal(&self) -> Result<Principal, AppError> {
        self.principal.ok_or_else(|| {
            tracing::error!(path = %self.path(), "Principal requested on an unauthenticated route");
            AppError::internal("internal server error")
        })
    }

    pub fn optional_principal(&self) -> Option<Principal> {
        self.principal
    }

    pub fn attach_payload(&mut self, payload: P) {
        self.payload = Some(payload);
    }

    /// Hands the validated payload to its single consumer.
    ///
    /// # Errors
    ///
    /// [`AppError::Internal`] when no validation layer ran or the payload was
    /// already taken.
    pub fn take_payload(&mut self) -> Result<P, AppError> {
        self.payload.take().ok_or_else(|| {
            tracing::error!(path = %self.path(), "Validated payload missing");
            AppError::internal("internal server error")
        })
    }

    /// Headers added to whatever response leaves the pipeline, error or not.
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    pub(crate) fn take_response_headers(&mut self) -> HeaderMap {
        std::mem::take(&mut self.response_headers)
    }
}
