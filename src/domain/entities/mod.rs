//! Core domain entities.
//!
//! Plain data structures without behaviour beyond small accessors:
//!
//! - [`Link`] - an alias bound to an original URL
//! - [`User`] - an account created through an identity provider
//! - [`Principal`] - the caller identity carried by a session token
//!
//! Creation inputs use separate structs (`NewLink`, `NewUser`) so the
//! store-assigned fields (ids, timestamps) only ever come from the store.

pub mod link;
pub mod principal;
pub mod user;

pub use link::{DateSort, Link, LinkFilter, LinkPage, NewLink};
pub use principal::Principal;
pub use user::{NewUser, SignInMethod, User};
