//! CORS headers and preflight handling.

use async_trait::async_trait;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;

use crate::api::pipeline::{Exchange, Handler, HandlerResult, Middleware};

const ALLOWED_METHODS: &str = "POST, GET, OPTIONS, PUT, PATCH, DELETE";
const ALLOWED_HEADERS: &str =
    "Accept, Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization";

/// Adds the CORS headers to every response leaving the pipeline, errors
/// included, and answers preflight requests without calling inner layers.
pub struct Cors {
    allow_origin: HeaderValue,
}

impl Cors {
    pub fn new(allow_origin: HeaderValue) -> Self {
        Self { allow_origin }
    }
}

#[async_trait]
impl<P: Send + 'static> Middleware<P> for Cors {
    async fn handle(&self, exchange: &mut Exchange<P>, next: &dyn Handler<P>) -> HandlerResult {
        let headers = exchange.response_headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allow_origin.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );

        if exchange.method == Method::OPTIONS {
            return Ok(StatusCode::OK.into_response());
        }

        next.call(exchange).await
    }
}
