//! Handler and middleware contracts and their composition.

use async_trait::async_trait;
use axum::response::Response;
use std::sync::Arc;

use super::exchange::Exchange;
use crate::error::AppError;

pub type HandlerResult = Result<Response, AppError>;

/// Innermost unit of a pipeline: produces the success response.
#[async_trait]
pub trait Handler<P: Send + 'static>: Send + Sync {
    async fn call(&self, exchange: &mut Exchange<P>) -> HandlerResult;
}

/// Cross-cutting layer wrapped around a handler.
///
/// A middleware either calls `next` or short-circuits by returning an error;
/// it never renders an error body itself.
#[async_trait]
pub trait Middleware<P: Send + 'static>: Send + Sync {
    async fn handle(&self, exchange: &mut Exchange<P>, next: &dyn Handler<P>) -> HandlerResult;
}

struct Layered<P: Send + 'static> {
    middleware: Arc<dyn Middleware<P>>,
    inner: Arc<dyn Handler<P>>,
}

#[async_trait]
impl<P: Send + 'static> Handler<P> for Layered<P> {
    async fn call(&self, exchange: &mut Exchange<P>) -> HandlerResult {
        self.middleware.handle(exchange, self.inner.as_ref()).await
    }
}

/// Wraps `terminal` so that `middlewares[0]` is the outermost layer.
///
/// `[m1, m2, m3]` composes to `m1(m2(m3(terminal)))`: `m1` runs first on the
/// way in and last on the way out.
pub fn compose<P: Send + 'static>(
    terminal: Arc<dyn Handler<P>>,
    middlewares: Vec<Arc<dyn Middleware<P>>>,
) -> Arc<dyn Handler<P>> {
    middlewares
        .into_iter()
        .rev()
        .fold(terminal, |inner, middleware| {
            Arc::new(Layered { middleware, inner })
        })
}
