//! Link entity representing a persisted alias mapping.

use chrono::{DateTime, Utc};

/// A stored alias pointing at an original URL.
///
/// `owner_id` is `None` for links created through the guest route. The owner
/// and the original URL never change after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub owner_id: Option<i64>,
    pub original_url: String,
    pub alias: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        owner_id: Option<i64>,
        original_url: String,
        alias: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            original_url,
            alias,
            created_at,
            updated_at,
        }
    }

    /// Returns true if the link belongs to the given user.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub owner_id: Option<i64>,
    pub original_url: String,
    pub alias: String,
}

/// Ordering of a link listing by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateSort {
    #[default]
    Newest,
    Oldest,
}

/// Owner-scoped listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFilter {
    /// Case-insensitive substring matched against alias or original URL.
    pub search: Option<String>,
    pub sort: DateSort,
    pub limit: i64,
    pub skip: i64,
}

/// One page of a listing plus the owner's total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPage {
    pub links: Vec<Link>,
    pub total: i64,
}
