//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (setup):
//!     RouteBuilder tokens
//!     → pattern.rs (compile literal / {regex} / {name:regex})
//!     → route.rs (per-facet matcher sets)
//!     → commit: snapshot copy
//!     → table.rs (append, registration order)
//!
//! Incoming request:
//!     RawRequest
//!     → descriptor.rs (segments, extension, multimaps)
//!     → dispatcher.rs (scan table, first match wins)
//!     → matcher.rs (evaluate each facet)
//!     → Handler(Ctx) or not-found handler
//! ```
//!
//! # Design Decisions
//! - Routes are immutable once committed
//! - Linear scan in registration order; the first matching route wins
//! - Pattern errors surface at registration, never while matching
//! - Matching is pure: no I/O, no mutation, safe under any concurrency

pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod pattern;
pub mod route;
pub mod table;

pub use descriptor::{normalize, Descriptor, MultiMap, RawRequest};
pub use dispatcher::{Dispatch, Dispatcher, ErrorHandler};
pub use error::{HandlerError, RouteError};
pub use handler::{Ctx, Handler, HandlerFuture, SharedHandler};
pub use matcher::{Args, Matcher};
pub use route::{Route, RouteBuilder};
pub use table::{Entry, RouteId, RouteTable};
