//! Request handler contract.

use axum::body::Bytes;
use axum::response::Response;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

use crate::routing::descriptor::Descriptor;
use crate::routing::error::HandlerError;
use crate::routing::matcher::Args;

/// Future returned by [`Handler::call`].
pub type HandlerFuture = BoxFuture<'static, Result<Response, HandlerError>>;

/// Everything a handler receives for one request.
#[derive(Debug, Clone)]
pub struct Ctx {
    /// Normalized request view the route was matched against.
    pub descriptor: Arc<Descriptor>,
    /// Captures bound by the matched route (empty for not-found).
    pub args: Args,
    /// Buffered request body.
    pub body: Bytes,
    /// Value of the `x-request-id` header, when present.
    pub request_id: Option<String>,
}

impl Ctx {
    pub fn new(descriptor: Arc<Descriptor>, args: Args) -> Self {
        Self {
            descriptor,
            args,
            body: Bytes::new(),
            request_id: None,
        }
    }

    /// Captured value for `name`.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }
}

/// An async request handler bound to a route.
///
/// Implemented for every `Fn(Ctx) -> impl Future<Output = Result<Response, HandlerError>>`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: Ctx) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Ctx) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    fn call(&self, ctx: Ctx) -> HandlerFuture {
        Box::pin(self(ctx))
    }
}

/// Shared, type-erased handler.
pub type SharedHandler = Arc<dyn Handler>;
