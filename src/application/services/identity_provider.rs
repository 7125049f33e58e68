//! Identity-provider token verification.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::AppError;

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const INVALID_ID_TOKEN: &str = "invalid id token";

/// Profile asserted by a verified identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub email: String,
    pub email_verified: bool,
    pub first_name: String,
    pub last_name: String,
    pub picture: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies an id token and returns the profile it asserts.
    ///
    /// # Errors
    ///
    /// [`AppError::Unauthorized`] when the token is rejected or lacks a
    /// required claim.
    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityProfile, AppError>;
}

/// Verifies Google id tokens through the `tokeninfo` endpoint, which checks
/// signature and expiry; the audience is checked here.
pub struct GoogleIdentityProvider {
    client: Client,
    client_id: String,
    endpoint: String,
}

impl GoogleIdentityProvider {
    pub fn new(client_id: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to build HTTP client");
                AppError::internal("internal server error")
            })?;

        Ok(Self {
            client,
            client_id,
            endpoint: GOOGLE_TOKENINFO_URL.to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityProfile, AppError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Identity provider unreachable");
                AppError::internal("unable to verify id token")
            })?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Id token rejected");
            return Err(AppError::unauthorized(INVALID_ID_TOKEN));
        }

        let claims: Value = response
            .json()
            .await
            .map_err(|_| AppError::unauthorized(INVALID_ID_TOKEN))?;

        if claims.get("aud").and_then(Value::as_str) != Some(self.client_id.as_str()) {
            return Err(AppError::unauthorized(INVALID_ID_TOKEN));
        }

        profile_from_claims(&claims)
    }
}

fn string_claim(claims: &Value, name: &str) -> Result<String, AppError> {
    claims
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::unauthorized(format!("{name} claim missing in ID token")))
}

/// Extracts the required profile claims. `email_verified` may arrive as a
/// boolean or as the string `"true"`.
pub fn profile_from_claims(claims: &Value) -> Result<IdentityProfile, AppError> {
    let email = string_claim(claims, "email")?;
    let email_verified = match claims.get("email_verified") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => {
            return Err(AppError::unauthorized(
                "email_verified claim missing in ID token",
            ));
        }
    };

    Ok(IdentityProfile {
        email,
        email_verified,
        first_name: string_claim(claims, "given_name")?,
        last_name: string_claim(claims, "family_name")?,
        picture: string_claim(claims, "picture")?,
    })
}
