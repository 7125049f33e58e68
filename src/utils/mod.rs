//! Helper functions used across the application.
//!
//! - [`alias_generator`] - alias candidates derived from a URL digest
//! - [`client_ip`] - caller address resolution for rate-limit keys
//! - [`cookie`] - session cookie parsing and formatting

pub mod alias_generator;
pub mod client_ip;
pub mod cookie;
