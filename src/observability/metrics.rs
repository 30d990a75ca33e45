//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by outcome, route
//! - `router_handler_errors_total` (counter): handler failures by route
//! - `router_dispatch_duration_seconds` (histogram): normalize + match latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Route label is the route name, or its id for unnamed routes

use std::net::SocketAddr;
use std::time::Instant;

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "router_requests_total";
pub const HANDLER_ERRORS_TOTAL: &str = "router_handler_errors_total";
pub const DISPATCH_DURATION_SECONDS: &str = "router_dispatch_duration_seconds";

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record the outcome of matching one request.
pub fn record_dispatch(matched: bool, route: &str, start: Instant) {
    let outcome = if matched { "matched" } else { "not_found" };
    counter!(REQUESTS_TOTAL, "outcome" => outcome, "route" => route.to_string()).increment(1);
    histogram!(DISPATCH_DURATION_SECONDS).record(start.elapsed().as_secs_f64());
}

pub fn record_handler_error(route: &str) {
    counter!(HANDLER_ERRORS_TOTAL, "route" => route.to_string()).increment(1);
}
