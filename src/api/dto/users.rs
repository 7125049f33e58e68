//! DTOs for the `/user` routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{Validatable, describe};
use crate::domain::entities::{SignInMethod, User};

/// Body of `POST /user`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "id token must exist"))]
    pub id_token: String,

    pub sign_in_with: String,
}

impl CreateUserPayload {
    pub fn sign_in_method(&self) -> Option<SignInMethod> {
        self.sign_in_with.parse().ok()
    }
}

impl Validatable for CreateUserPayload {
    fn validate_payload(&self) -> Option<String> {
        if let Err(errors) = self.validate() {
            return Some(describe(&errors));
        }
        if self.sign_in_method().is_none() {
            return Some("invalid sign in method".to_string());
        }
        None
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub picture: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            picture: user.picture,
            verified: user.verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> CreateUserPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_payload() {
        let p = payload(r#"{"idToken":"tok","signInWith":"google"}"#);
        assert_eq!(p.validate_payload(), None);
        assert_eq!(p.sign_in_method(), Some(SignInMethod::Google));
    }

    #[test]
    fn test_missing_token() {
        let p = payload(r#"{"idToken":"","signInWith":"google"}"#);
        assert_eq!(p.validate_payload().as_deref(), Some("id token must exist"));
    }

    #[test]
    fn test_unknown_method() {
        let p = payload(r#"{"idToken":"tok","signInWith":"facebook"}"#);
        assert_eq!(p.validate_payload().as_deref(), Some("invalid sign in method"));
    }

    #[test]
    fn test_github_is_a_valid_method_name() {
        let p = payload(r#"{"idToken":"tok","signInWith":"github"}"#);
        assert_eq!(p.validate_payload(), None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(
            serde_json::from_str::<CreateUserPayload>(
                r#"{"idToken":"tok","signInWith":"google","role":"admin"}"#
            )
            .is_err()
        );
    }
}
