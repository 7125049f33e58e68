//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide the operations the HTTP
//! handlers call.
//!
//! # Available Services
//!
//! - [`services::LinkService`] - alias allocation, redirect lookup, listing and deletion
//! - [`services::UserService`] - sign-in, profile and account deletion
//! - [`services::SessionService`] - session token signing and verification
//! - [`services::IdentityProvider`] - identity-provider token verification

pub mod services;
