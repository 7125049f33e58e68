//! PostgreSQL link repository tests. Run with a database:
//! `DATABASE_URL=... cargo test -- --ignored`

mod common;

use alias_shortener::domain::entities::{DateSort, LinkFilter, NewLink};
use alias_shortener::domain::repositories::LinkRepository;
use alias_shortener::infrastructure::persistence::PgLinkRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_link(alias: &str, owner_id: Option<i64>) -> NewLink {
    NewLink {
        owner_id,
        original_url: format!("https://example.com/{alias}"),
        alias: alias.to_string(),
    }
}

fn filter(search: Option<&str>, sort: DateSort) -> LinkFilter {
    LinkFilter {
        search: search.map(str::to_string),
        sort,
        limit: 100,
        skip: 0,
    }
}

#[sqlx::test]
#[ignore]
async fn test_insert_and_find_by_alias(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let id = repo.insert(new_link("abc123", None)).await.unwrap();
    let link = repo.find_by_alias("abc123").await.unwrap().unwrap();

    assert_eq!(link.id, id);
    assert_eq!(link.original_url, "https://example.com/abc123");
    assert!(link.owner_id.is_none());
}

#[sqlx::test]
#[ignore]
async fn test_duplicate_alias_is_conflict(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.insert(new_link("dup", None)).await.unwrap();
    let err = repo.insert(new_link("dup", None)).await.unwrap_err();

    assert!(err.is_conflict());
    assert!(err.message().contains("links_alias_key"));
}

#[sqlx::test]
#[ignore]
async fn test_find_owned_checks_owner(pool: PgPool) {
    let owner = common::insert_pg_user(&pool, "owner@example.com").await;
    let other = common::insert_pg_user(&pool, "other@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let id = repo.insert(new_link("mine", Some(owner))).await.unwrap();

    assert!(repo.find_owned(id, owner).await.unwrap().is_some());
    assert!(repo.find_owned(id, other).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore]
async fn test_list_owned_search_sort_and_total(pool: PgPool) {
    let owner = common::insert_pg_user(&pool, "owner@example.com").await;
    common::insert_pg_link(&pool, "alpha", "https://one.example.com", Some(owner)).await;
    common::insert_pg_link(&pool, "beta", "https://two.example.com", Some(owner)).await;
    common::insert_pg_link(&pool, "gamma", "https://rust-lang.org", Some(owner)).await;
    common::insert_pg_link(&pool, "100%", "https://percent.example.com", Some(owner)).await;
    common::insert_pg_link(&pool, "loner", "https://one.example.com", None).await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let page = repo
        .list_owned(owner, filter(None, DateSort::Newest))
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.links[0].alias, "100%");

    let page = repo
        .list_owned(owner, filter(Some("EXAMPLE"), DateSort::Oldest))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.links[0].alias, "alpha");

    let page = repo
        .list_owned(owner, filter(Some("%"), DateSort::Newest))
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    let page = repo
        .list_owned(
            owner,
            LinkFilter {
                limit: 1,
                skip: 1,
                ..filter(None, DateSort::Oldest)
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.links.len(), 1);
    assert_eq!(page.links[0].alias, "beta");
}

#[sqlx::test]
#[ignore]
async fn test_delete_many_owned(pool: PgPool) {
    let owner = common::insert_pg_user(&pool, "owner@example.com").await;
    let a = common::insert_pg_link(&pool, "one", "https://example.com/1", Some(owner)).await;
    let b = common::insert_pg_link(&pool, "two", "https://example.com/2", Some(owner)).await;
    let c = common::insert_pg_link(&pool, "three", "https://example.com/3", None).await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let deleted = repo.delete_many_owned(&[a, b, c], owner).await.unwrap();

    assert_eq!(deleted, 2);
    assert!(repo.find_by_id(c).await.unwrap().is_some());
    assert!(!repo.delete_owned(a, owner).await.unwrap());
}
