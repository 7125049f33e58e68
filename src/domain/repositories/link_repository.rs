//! Repository trait for link data access.

use crate::domain::entities::{Link, LinkFilter, LinkPage, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for alias mappings.
///
/// The storage behind it must enforce alias uniqueness on its own: the
/// existence checks done by [`crate::application::services::LinkService`]
/// are only a fast path and race under concurrent writers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Persists a new link and returns its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the alias is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, new_link: NewLink) -> Result<i64, AppError>;

    /// Finds a link by id regardless of owner.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Finds a link by its alias.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    async fn find_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by id only if it belongs to `owner_id`.
    async fn find_owned(&self, id: i64, owner_id: i64) -> Result<Option<Link>, AppError>;

    /// Lists the owner's links matching the filter, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors or when the read
    /// exceeds its time bound.
    async fn list_owned(&self, owner_id: i64, filter: LinkFilter) -> Result<LinkPage, AppError>;

    /// Deletes one owned link. Returns `Ok(false)` if nothing matched.
    async fn delete_owned(&self, id: i64, owner_id: i64) -> Result<bool, AppError>;

    /// Deletes every listed link that belongs to the owner and returns the
    /// number of deleted rows. Ids owned by someone else are ignored.
    async fn delete_many_owned(&self, ids: &[i64], owner_id: i64) -> Result<u64, AppError>;
}
