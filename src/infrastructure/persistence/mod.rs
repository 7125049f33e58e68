//! Repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] / [`PgUserRepository`] - PostgreSQL via SQLx
//! - [`InMemoryLinkRepository`] / [`InMemoryUserRepository`] - process-local

pub mod memory;
pub mod pg_link_repository;
pub mod pg_user_repository;

pub use memory::{InMemoryLinkRepository, InMemoryUserRepository};
pub use pg_link_repository::PgLinkRepository;
pub use pg_user_repository::PgUserRepository;
