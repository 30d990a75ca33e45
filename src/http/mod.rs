//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, body buffering)
//!     → request.rs (http::Request → RawRequest)
//!     → routing::Dispatcher (match, run handler)
//!     → response.rs (static responders for declarative routes)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{raw_request, X_REQUEST_ID};
pub use response::StaticResponder;
pub use server::HttpServer;
