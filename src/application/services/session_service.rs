//! Signed session tokens carried in the session cookie.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Principal;
use crate::error::AppError;

const ISSUER: &str = "alias-shortener";
const AUDIENCE: &str = "alias-shortener-web";

pub const TOKEN_EXPIRED: &str = "access token expired";
pub const TOKEN_INVALID: &str = "invalid authentication token";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// A freshly signed token and the moment it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// HS256 signer and verifier for session tokens.
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "nbf", "sub", "iss", "aud"]);
        validation.validate_nbf = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, principal: Principal) -> Result<IssuedSession, AppError> {
        self.issue_at(principal, Utc::now())
    }

    /// Signs a token as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        principal: Principal,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedSession, AppError> {
        let expires_at = issued_at + self.ttl;
        let claims = SessionClaims {
            sub: principal.user_id.to_string(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to sign session token");
                AppError::internal("unable to sign session")
            })?;

        Ok(IssuedSession { token, expires_at })
    }

    /// Verifies signature, lifetime, issuer and audience.
    ///
    /// # Errors
    ///
    /// [`AppError::Unauthorized`] with [`TOKEN_EXPIRED`] for an expired token
    /// and [`TOKEN_INVALID`] for anything else.
    pub fn verify(&self, token: &str) -> Result<Principal, AppError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::unauthorized(TOKEN_EXPIRED),
                _ => AppError::unauthorized(TOKEN_INVALID),
            },
        )?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::unauthorized(TOKEN_INVALID))?;

        Ok(Principal::new(user_id))
    }
}
