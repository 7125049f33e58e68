//! Pipeline middlewares.
//!
//! Each type implements [`Middleware`](crate::api::pipeline::Middleware) for
//! every payload type, so one instance can be shared across routes.
//!
//! - [`cors::Cors`] - CORS headers, preflight answers
//! - [`client_key::ClientKey`] - static client credential
//! - [`rate_gate::RateGate`] - shared-counter admission
//! - [`payload_validation::PayloadValidation`] - strict JSON decoding and validation
//! - [`authenticate::Authenticate`] - session cookie verification
//!
//! [`tracing`] is a tower layer applied to the whole router instead.

pub mod authenticate;
pub mod client_key;
pub mod cors;
pub mod payload_validation;
pub mod rate_gate;
pub mod tracing;

pub use authenticate::Authenticate;
pub use client_key::ClientKey;
pub use cors::Cors;
pub use payload_validation::PayloadValidation;
pub use rate_gate::RateGate;
