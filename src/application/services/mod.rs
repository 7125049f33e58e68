//! Business logic services for the application layer.

pub mod identity_provider;
pub mod link_service;
pub mod session_service;
pub mod user_service;

pub use identity_provider::{GoogleIdentityProvider, IdentityProfile, IdentityProvider};
pub use link_service::LinkService;
pub use session_service::{IssuedSession, SessionService};
pub use user_service::UserService;
