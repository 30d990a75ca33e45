//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Trigger → HTTP server stops accepting → in-flight requests drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup in main: config, logging, routes, then listener
//! - Ordered shutdown: stop accept, drain, close

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
