//! Process-local repositories.
//!
//! They honour the same uniqueness rules as the PostgreSQL schema (unique
//! alias, unique email, links removed with their owner) and back the HTTP
//! tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::entities::{DateSort, Link, LinkFilter, LinkPage, NewLink, NewUser, User};
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::error::AppError;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex
        .lock()
        .map_err(|_| AppError::internal("internal server error"))
}

#[derive(Default)]
struct LinkTable {
    next_id: i64,
    rows: BTreeMap<i64, Link>,
}

#[derive(Default)]
pub struct InMemoryLinkRepository {
    table: Mutex<LinkTable>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.table.lock().map(|t| t.rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_owner(&self, owner_id: i64) -> Result<(), AppError> {
        lock(&self.table)?
            .rows
            .retain(|_, link| !link.is_owned_by(owner_id));
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<i64, AppError> {
        let mut table = lock(&self.table)?;

        if table.rows.values().any(|l| l.alias == new_link.alias) {
            return Err(AppError::conflict(
                "unique constraint violation: links_alias_key",
            ));
        }

        table.next_id += 1;
        let id = table.next_id;
        let now = Utc::now();
        table.rows.insert(
            id,
            Link::new(
                id,
                new_link.owner_id,
                new_link.original_url,
                new_link.alias,
                now,
                now,
            ),
        );

        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(lock(&self.table)?.rows.get(&id).cloned())
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError> {
        Ok(lock(&self.table)?
            .rows
            .values()
            .find(|l| l.alias == alias)
            .cloned())
    }

    async fn find_owned(&self, id: i64, owner_id: i64) -> Result<Option<Link>, AppError> {
        Ok(lock(&self.table)?
            .rows
            .get(&id)
            .filter(|l| l.is_owned_by(owner_id))
            .cloned())
    }

    async fn list_owned(&self, owner_id: i64, filter: LinkFilter) -> Result<LinkPage, AppError> {
        let table = lock(&self.table)?;
        let needle = filter.search.as_deref().map(str::to_lowercase);

        let mut matched: Vec<Link> = table
            .rows
            .values()
            .filter(|l| l.is_owned_by(owner_id))
            .filter(|l| match &needle {
                Some(n) => {
                    l.alias.to_lowercase().contains(n) || l.original_url.to_lowercase().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect();

        matched.sort_by_key(|l| (l.created_at, l.id));
        if filter.sort == DateSort::Newest {
            matched.reverse();
        }

        let total = matched.len() as i64;
        let links = matched
            .into_iter()
            .skip(filter.skip.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();

        Ok(LinkPage { links, total })
    }

    async fn delete_owned(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        let mut table = lock(&self.table)?;
        let owned = table.rows.get(&id).is_some_and(|l| l.is_owned_by(owner_id));
        if owned {
            table.rows.remove(&id);
        }
        Ok(owned)
    }

    async fn delete_many_owned(&self, ids: &[i64], owner_id: i64) -> Result<u64, AppError> {
        let mut table = lock(&self.table)?;
        let before = table.rows.len();
        table
            .rows
            .retain(|id, link| !(ids.contains(id) && link.is_owned_by(owner_id)));
        Ok((before - table.rows.len()) as u64)
    }
}

#[derive(Default)]
struct UserTable {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

/// In-memory users. Deleting a user also removes their links from the
/// attached link repository.
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
    links: Arc<InMemoryLinkRepository>,
}

impl InMemoryUserRepository {
    pub fn new(links: Arc<InMemoryLinkRepository>) -> Self {
        Self {
            table: Mutex::new(UserTable::default()),
            links,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(lock(&self.table)?.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(lock(&self.table)?
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<i64, AppError> {
        let mut table = lock(&self.table)?;

        if table.rows.values().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict(
                "unique constraint violation: users_email_key",
            ));
        }

        table.next_id += 1;
        let id = table.next_id;
        let now = Utc::now();
        table.rows.insert(
            id,
            User {
                id,
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                email: new_user.email,
                picture: new_user.picture,
                verified: new_user.verified,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn delete_with_links(&self, id: i64) -> Result<bool, AppError> {
        let mut table = lock(&self.table)?;
        if table.rows.remove(&id).is_none() {
            return Ok(false);
        }
        self.links.remove_owner(id)?;
        Ok(true)
    }
}
