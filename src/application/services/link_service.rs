//! Alias allocation, lookup and deletion of links.

use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::entities::{Link, LinkFilter, LinkPage, NewLink, Principal};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::alias_generator::AliasGenerator;

/// Candidates tried for one generated alias before giving up.
pub const MAX_ALIAS_ATTEMPTS: usize = 50;

pub const ALIAS_TAKEN: &str = "alias already exist. try another one";
pub const ALIAS_EXHAUSTED: &str = "unable to generate a short url. please contact support";
pub const ALIAS_EXISTS: &str = "alias exist";
pub const UNKNOWN_ALIAS: &str = "no url found for the alias";

/// Service owning every read and write of links.
///
/// Allocation pre-checks alias existence, but the repository's uniqueness
/// constraint is what makes the alias unique under concurrent writers; a
/// conflicting insert is treated exactly like a failed pre-check.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
}

impl LinkService {
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    /// Allocates an alias and stores the link.
    ///
    /// A supplied alias is used verbatim when free. Without one, candidates
    /// are derived from the URL digest and retried up to
    /// [`MAX_ALIAS_ATTEMPTS`] times. The stored record is read back before it
    /// is returned, so store-assigned fields are included.
    ///
    /// # Errors
    ///
    /// - [`AppError::BadRequest`] if the supplied alias is taken
    /// - [`AppError::Internal`] if every generated candidate collided, or on
    ///   repository failure (never retried)
    pub async fn create_link(
        &self,
        original_url: String,
        alias: Option<String>,
        owner: Option<Principal>,
    ) -> Result<Link, AppError> {
        let owner_id = owner.map(|p| p.user_id);

        let id = match alias.filter(|a| !a.is_empty()) {
            Some(alias) => self.insert_supplied(original_url, alias, owner_id).await?,
            None => self.insert_generated(original_url, owner_id).await?,
        };

        self.links
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::internal("unable to find url"))
    }

    async fn insert_supplied(
        &self,
        original_url: String,
        alias: String,
        owner_id: Option<i64>,
    ) -> Result<i64, AppError> {
        if self.links.find_by_alias(&alias).await?.is_some() {
            return Err(AppError::bad_request(ALIAS_TAKEN));
        }

        let new_link = NewLink {
            owner_id,
            original_url,
            alias,
        };

        match self.links.insert(new_link).await {
            Ok(id) => Ok(id),
            Err(e) if e.is_conflict() => Err(AppError::bad_request(ALIAS_TAKEN)),
            Err(e) => Err(e),
        }
    }

    async fn insert_generated(
        &self,
        original_url: String,
        owner_id: Option<i64>,
    ) -> Result<i64, AppError> {
        let mut generator = AliasGenerator::new(&original_url);

        for attempt in 1..=MAX_ALIAS_ATTEMPTS {
            let alias = generator.candidate();

            if self.links.find_by_alias(&alias).await?.is_some() {
                counter!("alias_collisions_total").increment(1);
                debug!(attempt, "Alias candidate already taken");
                continue;
            }

            let new_link = NewLink {
                owner_id,
                original_url: original_url.clone(),
                alias,
            };

            match self.links.insert(new_link).await {
                Ok(id) => {
                    counter!("aliases_generated_total").increment(1);
                    return Ok(id);
                }
                Err(e) if e.is_conflict() => {
                    counter!("alias_collisions_total").increment(1);
                    debug!(attempt, "Alias candidate lost an insert race");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            attempts = MAX_ALIAS_ATTEMPTS,
            "Alias allocation exhausted its retry budget"
        );
        Err(AppError::internal(ALIAS_EXHAUSTED))
    }

    /// Succeeds when the alias is free.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] ("alias exist") when it is taken.
    pub async fn check_alias(&self, alias: &str) -> Result<(), AppError> {
        match self.links.find_by_alias(alias).await? {
            Some(_) => Err(AppError::bad_request(ALIAS_EXISTS)),
            None => Ok(()),
        }
    }

    /// Returns one of the principal's links.
    pub async fn get_link(&self, id: i64, principal: Principal) -> Result<Link, AppError> {
        self.links
            .find_owned(id, principal.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("url not found"))
    }

    pub async fn list_links(
        &self,
        principal: Principal,
        filter: LinkFilter,
    ) -> Result<LinkPage, AppError> {
        self.links.list_owned(principal.user_id, filter).await
    }

    pub async fn delete_link(&self, id: i64, principal: Principal) -> Result<(), AppError> {
        if self.links.delete_owned(id, principal.user_id).await? {
            info!(link_id = id, user_id = principal.user_id, "Link deleted");
            Ok(())
        } else {
            Err(AppError::not_found("url not found"))
        }
    }

    /// Deletes the listed links the principal owns. Returns how many went.
    pub async fn delete_links(&self, ids: &[i64], principal: Principal) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Err(AppError::bad_request("one url id must be provided"));
        }

        let deleted = self.links.delete_many_owned(ids, principal.user_id).await?;
        info!(
            requested = ids.len(),
            deleted,
            user_id = principal.user_id,
            "Links deleted"
        );
        Ok(deleted)
    }

    /// Resolves an alias to the URL to redirect to.
    ///
    /// # Errors
    ///
    /// An unknown alias is a client error ([`AppError::BadRequest`]), not a
    /// not-found.
    pub async fn resolve_redirect(&self, alias: &str) -> Result<String, AppError> {
        self.links
            .find_by_alias(alias)
            .await?
            .map(|link| link.original_url)
            .ok_or_else(|| AppError::bad_request(UNKNOWN_ALIAS))
    }
}
