//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse, status codes)
//! - Compile every route token so pattern errors surface before serving
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

use crate::config::routes::build_route;
use crate::config::schema::RouterConfig;
use crate::routing::{RouteError, RouteTable};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("route #{0} has no name")]
    UnnamedRoute(usize),

    #[error("route name `{0}` is used more than once")]
    DuplicateRoute(String),

    #[error("route `{route}`: {source}")]
    Route {
        route: String,
        #[source]
        source: RouteError,
    },
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    // Routes are compiled against a scratch table and never committed.
    let scratch = Arc::new(RouteTable::new());
    let mut names = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.name.is_empty() {
            errors.push(ValidationError::UnnamedRoute(index));
        } else if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }

        if let Err(source) = build_route(&scratch, route) {
            errors.push(ValidationError::Route {
                route: route.name.clone(),
                source,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
