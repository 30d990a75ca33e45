//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON optional) for machine parsing
//! - Request ID carried into every dispatch log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
