//! Strict body decoding followed by payload self-validation.

use async_trait::async_trait;
use axum::body::to_bytes;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::debug;

use crate::api::dto::Validatable;
use crate::api::pipeline::{Exchange, Handler, HandlerResult, Middleware};
use crate::error::AppError;

/// Largest accepted request body.
pub const MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const INVALID_PAYLOAD: &str = "invalid payload";

/// Decodes the JSON body into `P`, runs its validation, and attaches it to
/// the exchange for the terminal handler.
///
/// Rejects oversized bodies, unparseable bodies, and unknown fields (payload
/// types deny them during deserialization).
pub struct PayloadValidation<P> {
    _payload: PhantomData<fn() -> P>,
}

impl<P> PayloadValidation<P> {
    pub fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }
}

impl<P> Default for PayloadValidation<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<P> Middleware<P> for PayloadValidation<P>
where
    P: DeserializeOwned + Validatable + Send + 'static,
{
    async fn handle(&self, exchange: &mut Exchange<P>, next: &dyn Handler<P>) -> HandlerResult {
        let body = exchange
            .take_body()
            .ok_or_else(|| AppError::bad_request(INVALID_PAYLOAD))?;

        let bytes = to_bytes(body, MAX_PAYLOAD_BYTES).await.map_err(|e| {
            debug!(error = %e, "Request body unreadable or too large");
            AppError::bad_request(INVALID_PAYLOAD)
        })?;

        let payload: P = serde_json::from_slice(&bytes).map_err(|e| {
            debug!(error = %e, "Request body rejected");
            AppError::bad_request(INVALID_PAYLOAD)
        })?;

        if let Some(message) = payload.validate_payload() {
            return Err(AppError::bad_request(format!("Validation error: {message}")));
        }

        exchange.attach_payload(payload);
        next.call(exchange).await
    }
}
