//! Multi-facet HTTP request router.
//!
//! Routes are conjunctions of per-facet predicates over the path segments,
//! method, extension, host, query parameters and headers of a request. Each
//! predicate is a literal, an anonymous `{regex}` or a capturing
//! `{name:regex}` token. The first registered route that matches wins.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Args, Ctx, Dispatcher, HandlerError, RawRequest, RouteBuilder, RouteError};
