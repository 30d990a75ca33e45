//! Request dispatch.
//!
//! # Responsibilities
//! - Normalize the request once
//! - Scan the route table in registration order, first match wins
//! - Fall back to the not-found handler when nothing matches
//! - Invoke the selected handler and route failures to the error handler
//!
//! # Design Decisions
//! - The dispatcher owns its route table; there is no process-global registry
//! - No-match is not an error, it is the not-found path
//! - A handler error never escapes `serve`: the error handler sees it and the
//!   client gets a 500
//! - The default error handler is fatal (panics after logging); the panic
//!   unwinds only the task serving that request

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Instant;

use crate::observability::metrics;
use crate::routing::descriptor::{normalize, Descriptor, RawRequest};
use crate::routing::error::HandlerError;
use crate::routing::handler::{Ctx, Handler, SharedHandler};
use crate::routing::matcher::Args;
use crate::routing::route::RouteBuilder;
use crate::routing::table::{RouteId, RouteTable};

/// Hook invoked with every handler failure.
pub type ErrorHandler = Arc<dyn Fn(&HandlerError) + Send + Sync>;

/// Outcome of matching one request.
pub struct Dispatch {
    pub handler: SharedHandler,
    pub args: Args,
    pub descriptor: Arc<Descriptor>,
    /// Matched route, or `None` for the not-found path.
    pub route: Option<RouteId>,
    pub route_name: Option<String>,
}

/// Matches requests against a route table and runs the selected handler.
pub struct Dispatcher {
    table: Arc<RouteTable>,
    not_found: SharedHandler,
    error_handler: ErrorHandler,
}

impl Dispatcher {
    /// Create a dispatcher with an empty table and the default hooks.
    pub fn new() -> Self {
        Self::with_table(Arc::new(RouteTable::new()))
    }

    pub fn with_table(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            not_found: Arc::new(default_not_found),
            error_handler: Arc::new(default_error_handler),
        }
    }

    /// Replace the handler used when no route matches.
    pub fn with_not_found<H: Handler>(mut self, handler: H) -> Self {
        self.not_found = Arc::new(handler);
        self
    }

    /// Replace the hook that receives handler failures.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&HandlerError) + Send + Sync + 'static,
    {
        self.error_handler = Arc::new(handler);
        self
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Start an empty route that commits into this dispatcher's table.
    pub fn route(&self) -> RouteBuilder {
        RouteBuilder::new(self.table.clone())
    }

    /// Select the handler and captures for `raw`.
    pub fn dispatch(&self, raw: &RawRequest) -> Dispatch {
        let descriptor = Arc::new(normalize(raw));

        match self.table.find(&descriptor) {
            Some((entry, args)) => Dispatch {
                handler: entry.handler,
                args,
                descriptor,
                route: Some(entry.id),
                route_name: entry.route.name().map(str::to_string),
            },
            None => Dispatch {
                handler: self.not_found.clone(),
                args: Args::new(),
                descriptor,
                route: None,
                route_name: None,
            },
        }
    }

    /// Dispatch `raw` and run the selected handler to completion.
    pub async fn serve(&self, raw: RawRequest, body: Bytes) -> Response {
        let start = Instant::now();
        let request_id = raw
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(crate::http::X_REQUEST_ID))
            .and_then(|(_, v)| v.first().cloned());

        let dispatch = self.dispatch(&raw);
        let route_label = dispatch
            .route_name
            .clone()
            .unwrap_or_else(|| {
                dispatch
                    .route
                    .map_or_else(|| "none".to_string(), |id| id.to_string())
            });
        metrics::record_dispatch(dispatch.route.is_some(), &route_label, start);

        match dispatch.route {
            Some(id) => tracing::debug!(
                request_id = ?request_id,
                route_id = id,
                route = %route_label,
                args = ?dispatch.args,
                "Route matched"
            ),
            None => tracing::debug!(
                request_id = ?request_id,
                method = %raw.method,
                path = %raw.path,
                "No route matched"
            ),
        }

        let ctx = Ctx {
            descriptor: dispatch.descriptor,
            args: dispatch.args,
            body,
            request_id: request_id.clone(),
        };

        match dispatch.handler.call(ctx).await {
            Ok(response) => response,
            Err(err) => {
                metrics::record_handler_error(&route_label);
                tracing::warn!(
                    request_id = ?request_id,
                    route = %route_label,
                    error = %err,
                    "Handler failed"
                );
                (self.error_handler)(&err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

async fn default_not_found(_ctx: Ctx) -> Result<Response, HandlerError> {
    Ok((StatusCode::NOT_FOUND, "404 page not found").into_response())
}

fn default_error_handler(err: &HandlerError) {
    tracing::error!(error = %err, "Unhandled handler error");
    panic!("unhandled handler error: {err}");
}
