//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the log filter from `RUST_LOG`, falling back to the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, human-readable format for development

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_logs {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

fn default_directives(level: &str) -> String {
    format!("route_mux={level},tower_http={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives("debug"), "route_mux=debug,tower_http=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = ObservabilityConfig::default();
        init_logging(&config);
        init_logging(&config);
    }
}
