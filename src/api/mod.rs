//! HTTP surface.
//!
//! - [`pipeline`] - request pipeline: exchange state, handler/middleware traits, error boundary
//! - [`middleware`] - CORS, client key, rate gate, payload validation, authentication
//! - [`dto`] - payload and response types
//! - [`handlers`] - terminal handlers, one per route
//! - [`routes`] - route table wiring pipelines to paths

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod routes;
