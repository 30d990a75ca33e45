//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Declarative routes, in precedence order.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest request body buffered for a handler, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A route declared in the config file.
///
/// Token lists use the same grammar as the builder API: `literal`, `{regex}`
/// or `{name:regex}`. `query` and `header` are flat key/value lists.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    pub path: Vec<String>,
    pub method: Vec<String>,
    pub ext: Vec<String>,
    pub host: Vec<String>,
    pub query: Vec<String>,
    pub header: Vec<String>,

    /// Fixed response served when the route matches.
    pub response: ResponseConfig,
}

/// Static response for a declarative route.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// HTTP status code.
    pub status: u16,

    /// Value of the Content-Type header.
    pub content_type: String,

    /// Response body; `{name}` is replaced by the capture `name`.
    pub body: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            status: 200,
            content_type: "text/plain; charset=utf-8".to_string(),
            body: String::new(),
        }
    }
}
