//! Sign-in, profile and account deletion.

use std::sync::Arc;
use tracing::info;

use crate::application::services::identity_provider::IdentityProvider;
use crate::domain::entities::{NewUser, Principal, SignInMethod, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { users, identity }
    }

    /// Verifies the id token and returns the matching user, creating the
    /// account on first sign-in.
    ///
    /// # Errors
    ///
    /// - [`AppError::BadRequest`] for a sign-in method without a provider
    /// - [`AppError::Unauthorized`] when the provider rejects the token
    pub async fn sign_in(&self, method: SignInMethod, id_token: &str) -> Result<User, AppError> {
        if method != SignInMethod::Google {
            return Err(AppError::bad_request("invalid oauth type"));
        }

        let profile = self.identity.verify_id_token(id_token).await?;

        if let Some(user) = self.users.find_by_email(&profile.email).await? {
            return Ok(user);
        }

        let new_user = NewUser {
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email.clone(),
            picture: profile.picture,
            verified: profile.email_verified,
        };

        let id = match self.users.insert(new_user).await {
            Ok(id) => id,
            // Concurrent first sign-in created the row.
            Err(e) if e.is_conflict() => {
                return self
                    .users
                    .find_by_email(&profile.email)
                    .await?
                    .ok_or_else(|| AppError::internal("unable to find user"));
            }
            Err(e) => return Err(e),
        };

        info!(user_id = id, "User created");

        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::internal("unable to find user"))
    }

    pub async fn get_user(&self, principal: Principal) -> Result<User, AppError> {
        self.users
            .find_by_id(principal.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    /// Deletes the account and every link it owns in one transaction.
    pub async fn delete_user(&self, principal: Principal) -> Result<(), AppError> {
        if self.users.delete_with_links(principal.user_id).await? {
            info!(user_id = principal.user_id, "User deleted");
            Ok(())
        } else {
            Err(AppError::not_found("user not found"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::identity_provider::{
        IdentityProfile, MockIdentityProvider,
    };
    use crate::domain::repositories::MockUserRepository;
    use chrono::Utc;

    fn profile() -> IdentityProfile {
        IdentityProfile {
            email: "ada@example.com".to_string(),
            email_verified: true,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            picture: String::new(),
        }
    }

    fn user(id: i64) -> User {
        User {
            id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            picture: String::new(),
            verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn accepting_provider() -> MockIdentityProvider {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_verify_id_token()
            .withf(|token| token == "good-token")
            .returning(|_| Ok(profile()));
        identity
    }

    #[tokio::test]
    async fn test_existing_user_signs_in() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(user(3))));
        users.expect_insert().times(0);

        let service = UserService::new(Arc::new(users), Arc::new(accepting_provider()));
        let signed_in = service
            .sign_in(SignInMethod::Google, "good-token")
            .await
            .unwrap();

        assert_eq!(signed_in.id, 3);
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().times(1).returning(|_| Ok(None));
        users
            .expect_insert()
            .withf(|u| u.email == "ada@example.com" && u.verified)
            .times(1)
            .returning(|_| Ok(8));
        users
            .expect_find_by_id()
            .withf(|id| *id == 8)
            .returning(|id| Ok(Some(user(id))));

        let service = UserService::new(Arc::new(users), Arc::new(accepting_provider()));
        let created = service
            .sign_in(SignInMethod::Google, "good-token")
            .await
            .unwrap();

        assert_eq!(created.id, 8);
    }

    #[tokio::test]
    async fn test_github_is_rejected_before_verification() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_verify_id_token().times(0);

        let service = UserService::new(Arc::new(MockUserRepository::new()), Arc::new(identity));
        let err = service
            .sign_in(SignInMethod::Github, "token")
            .await
            .unwrap_err();

        assert_eq!(err, AppError::bad_request("invalid oauth type"));
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_verify_id_token()
            .returning(|_| Err(AppError::unauthorized("invalid id token")));
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().times(0);

        let service = UserService::new(Arc::new(users), Arc::new(identity));
        let err = service
            .sign_in(SignInMethod::Google, "bad")
            .await
            .unwrap_err();

        assert_eq!(err, AppError::unauthorized("invalid id token"));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let mut users = MockUserRepository::new();
        users.expect_delete_with_links().returning(|_| Ok(false));

        let service = UserService::new(Arc::new(users), Arc::new(MockIdentityProvider::new()));
        let err = service.delete_user(Principal::new(5)).await.unwrap_err();

        assert_eq!(err, AppError::not_found("user not found"));
    }
}
