//! Terminal handlers, one per route.
//!
//! Each type implements [`Handler`](crate::api::pipeline::Handler) for the
//! payload type its pipeline validates, or `()` when the route has no body.

pub mod fallback;
pub mod redirect;
pub mod urls;
pub mod users;

pub use redirect::RedirectAlias;
pub use urls::{CheckAlias, CreateUrl, DeleteUrl, DeleteUrls, GetUrl, ListUrls};
pub use users::{DeleteUser, GetUser, Logout, SignIn};
