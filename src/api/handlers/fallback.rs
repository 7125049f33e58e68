//! Router-level fallbacks rendering the uniform error shape.

use axum::http::{Method, StatusCode, Uri};
use axum::response::Response;

use crate::api::pipeline::{error_body, error_response};
use crate::error::AppError;

pub async fn not_found(method: Method, uri: Uri) -> Response {
    error_response(
        &AppError::not_found("Resource Not Found"),
        &method,
        uri.path(),
    )
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    error_body(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
        &method,
        uri.path(),
    )
}
