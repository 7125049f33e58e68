//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::entities::{DateSort, Link, LinkFilter, LinkPage, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Upper bound for the listing read (page plus count).
pub const LIST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, FromRow)]
struct LinkRow {
    id: i64,
    owner_id: Option<i64>,
    original_url: String,
    alias: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(
            r.id,
            r.owner_id,
            r.original_url,
            r.alias,
            r.created_at,
            r.updated_at,
        )
    }
}

/// PostgreSQL repository for alias mappings.
///
/// Alias uniqueness is enforced by the `links_alias_key` constraint; a losing
/// concurrent insert surfaces as [`AppError::Conflict`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Escapes `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO links (owner_id, original_url, alias)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(new_link.owner_id)
        .bind(&new_link.original_url)
        .bind(&new_link.alias)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, owner_id, original_url, alias, created_at, updated_at
            FROM links
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, owner_id, original_url, alias, created_at, updated_at
            FROM links
            WHERE alias = $1
            "#,
        )
        .bind(alias)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_owned(&self, id: i64, owner_id: i64) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, owner_id, original_url, alias, created_at, updated_at
            FROM links
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn list_owned(&self, owner_id: i64, filter: LinkFilter) -> Result<LinkPage, AppError> {
        let pattern = filter
            .search
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)));
        let order = match filter.sort {
            DateSort::Newest => "DESC",
            DateSort::Oldest => "ASC",
        };
        let page_sql = format!(
            r#"
            SELECT id, owner_id, original_url, alias, created_at, updated_at
            FROM links
            WHERE owner_id = $1
              AND ($2::text IS NULL OR alias ILIKE $2 OR original_url ILIKE $2)
            ORDER BY created_at {order}, id {order}
            LIMIT $3 OFFSET $4
            "#
        );

        let read = async {
            let rows = sqlx::query_as::<_, LinkRow>(&page_sql)
                .bind(owner_id)
                .bind(pattern.as_deref())
                .bind(filter.limit)
                .bind(filter.skip)
                .fetch_all(self.pool.as_ref())
                .await?;

            let total = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*)
                FROM links
                WHERE owner_id = $1
                  AND ($2::text IS NULL OR alias ILIKE $2 OR original_url ILIKE $2)
                "#,
            )
            .bind(owner_id)
            .bind(pattern.as_deref())
            .fetch_one(self.pool.as_ref())
            .await?;

            Ok::<_, AppError>(LinkPage {
                links: rows.into_iter().map(Link::from).collect(),
                total,
            })
        };

        match tokio::time::timeout(LIST_TIMEOUT, read).await {
            Ok(page) => page,
            Err(_) => {
                warn!(owner_id, "Link listing exceeded {:?}", LIST_TIMEOUT);
                Err(AppError::internal("unable to fetch urls"))
            }
        }
    }

    async fn delete_owned(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many_owned(&self, ids: &[i64], owner_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE owner_id = $1 AND id = ANY($2)")
            .bind(owner_id)
            .bind(ids)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
