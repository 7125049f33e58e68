//! Infrastructure layer for external integrations.
//!
//! Implements the interfaces defined by the domain and application layers.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL and in-memory repository implementations
//! - [`rate_limit`] - Redis and in-process rate-limit backends

pub mod persistence;
pub mod rate_limit;
