//! Outermost pipeline boundary: turns errors into the wire shape.

use axum::Json;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

use super::compose::{Handler, Middleware, compose};
use super::exchange::Exchange;
use crate::error::AppError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    message: &'a str,
    status_code: u16,
    path: &'a str,
    method: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct SuccessBody<T> {
    status_code: u16,
    data: T,
}

/// Renders an [`AppError`] as `{message, statusCode, path, method, timestamp}`.
pub fn error_response(err: &AppError, method: &Method, path: &str) -> Response {
    let status = err.status();

    if status.is_server_error() {
        error!(%method, path, status = status.as_u16(), message = err.message(), "Request failed");
    } else {
        debug!(%method, path, status = status.as_u16(), message = err.message(), "Request rejected");
    }

    error_body(status, err.message(), method, path)
}

/// The uniform error shape for any status, including ones no layer returns
/// (405 from the router).
pub fn error_body(status: StatusCode, message: &str, method: &Method, path: &str) -> Response {
    let body = ErrorBody {
        message,
        status_code: status.as_u16(),
        path,
        method: method.as_str(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    (status, Json(body)).into_response()
}

/// Renders `{status_code, data}`.
pub fn json_response<T: Serialize>(status: StatusCode, data: T) -> Response {
    let body = SuccessBody {
        status_code: status.as_u16(),
        data,
    };
    (status, Json(body)).into_response()
}

/// A composed handler plus the error boundary around it.
pub struct Pipeline<P: Send + 'static> {
    handler: Arc<dyn Handler<P>>,
}

impl<P: Send + 'static> Clone for Pipeline<P> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<P: Send + 'static> Pipeline<P> {
    pub fn builder(terminal: impl Handler<P> + 'static) -> PipelineBuilder<P> {
        PipelineBuilder {
            terminal: Arc::new(terminal),
            middlewares: Vec::new(),
        }
    }

    /// Runs the request through every layer.
    ///
    /// On success the handler's response is returned untouched apart from
    /// headers queued by the layers; on error the uniform error body is
    /// rendered here and nowhere else.
    pub async fn serve(&self, request: Request, path_params: HashMap<String, String>) -> Response {
        let mut exchange = Exchange::<P>::new(request, path_params);

        let mut response = match self.handler.call(&mut exchange).await {
            Ok(response) => response,
            Err(err) => error_response(&err, &exchange.method, exchange.path()),
        };

        response
            .headers_mut()
            .extend(exchange.take_response_headers());
        response
    }
}

/// Collects middlewares in outermost-first order.
pub struct PipelineBuilder<P: Send + 'static> {
    terminal: Arc<dyn Handler<P>>,
    middlewares: Vec<Arc<dyn Middleware<P>>>,
}

impl<P: Send + 'static> PipelineBuilder<P> {
    /// Adds a layer inside the ones added before it.
    pub fn layer(mut self, middleware: Arc<dyn Middleware<P>>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn build(self) -> Pipeline<P> {
        Pipeline {
            handler: compose(self.terminal, self.middlewares),
        }
    }
}
