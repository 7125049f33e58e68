//! Composable request pipeline.
//!
//! A route is a terminal [`Handler`] wrapped by an ordered list of
//! [`Middleware`]s, built with [`Pipeline::builder`]. The first layer added
//! is the outermost one. Request-scoped state (validated payload, principal,
//! headers queued for the response) travels in an explicit [`Exchange`]
//! rather than in request extensions.
//!
//! ```rust,ignore
//! let create = Pipeline::builder(CreateUrl::new(links))
//!     .layer(cors)                 // runs first
//!     .layer(client_key)
//!     .layer(rate_gate)
//!     .layer(payload_validation)
//!     .layer(authenticate)         // runs last, right before the handler
//!     .build();
//! ```
//!
//! Errors are values: every layer returns [`AppError`](crate::error::AppError)
//! and only [`Pipeline::serve`] renders it.

pub mod boundary;
pub mod compose;
pub mod exchange;

pub use boundary::{Pipeline, PipelineBuilder, error_body, error_response, json_response};
pub use compose::{Handler, HandlerResult, Middleware, compose};
pub use exchange::Exchange;
