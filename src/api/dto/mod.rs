//! Data Transfer Objects for API requests and responses.
//!
//! Request payloads implement [`Validatable`]; the payload validation
//! middleware depends only on that capability.

pub mod urls;
pub mod users;
pub mod validation;

pub use urls::{
    CheckAliasPayload, CreateUrlPayload, DeleteUrlsQuery, DeletedResponse, LinkListResponse,
    LinkResponse, ListUrlsQuery, RedirectQuery,
};
pub use users::{CreateUserPayload, UserResponse};
pub use validation::Validatable;
