//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Persists a new user and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    async fn insert(&self, new_user: NewUser) -> Result<i64, AppError>;

    /// Deletes the user together with every link they own, all or nothing.
    /// Returns `Ok(false)` if the user did not exist.
    async fn delete_with_links(&self, id: i64) -> Result<bool, AppError>;
}
