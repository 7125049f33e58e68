//! Static client credential check.

use async_trait::async_trait;
use axum::http::header;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::api::pipeline::{Exchange, Handler, HandlerResult, Middleware};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

pub const KEY_REQUIRED: &str = "authorization api key required";
pub const KEY_MALFORMED: &str = "malformed client authorization header";
pub const KEY_INVALID: &str = "invalid client authorization token";

/// Requires `Authorization: Bearer <client key>` on every request.
///
/// The presented key is compared through an HMAC tag so the comparison time
/// does not depend on how many leading bytes match.
pub struct ClientKey {
    key: Vec<u8>,
    tag: Vec<u8>,
}

impl ClientKey {
    pub fn new(client_key: &str) -> Result<Self, AppError> {
        let key = client_key.as_bytes().to_vec();
        let tag = Self::mac(&key)?
            .chain_update(&key)
            .finalize()
            .into_bytes()
            .to_vec();
        Ok(Self { key, tag })
    }

    fn mac(key: &[u8]) -> Result<HmacSha256, AppError> {
        HmacSha256::new_from_slice(key).map_err(|_| AppError::internal("internal server error"))
    }

    fn matches(&self, presented: &str) -> Result<bool, AppError> {
        Ok(Self::mac(&self.key)?
            .chain_update(presented.as_bytes())
            .verify_slice(&self.tag)
            .is_ok())
    }
}

#[async_trait]
impl<P: Send + 'static> Middleware<P> for ClientKey {
    async fn handle(&self, exchange: &mut Exchange<P>, next: &dyn Handler<P>) -> HandlerResult {
        let value = exchange
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::unauthorized(KEY_REQUIRED))?
            .to_str()
            .map_err(|_| AppError::bad_request(KEY_MALFORMED))?;

        let presented = match value.trim().split_once(' ') {
            Some((scheme, key)) if scheme.eq_ignore_ascii_case("bearer") && !key.trim().is_empty() => {
                key.trim()
            }
            _ => return Err(AppError::bad_request(KEY_MALFORMED)),
        };

        if !self.matches(presented)? {
            return Err(AppError::unauthorized(KEY_INVALID));
        }

        next.call(exchange).await
    }
}
