//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, route compilation)
//!     → RouterConfig (validated, immutable)
//!     → routes.rs (install declarative routes into the table)
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → routes.rs builds the new entry list
//!     → atomic swap of the route table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only routes are hot-reloaded; listener, timeouts and limits need a restart

pub mod loader;
pub mod routes;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, resolve_config, ConfigError};
pub use routes::{build_route, install_routes};
pub use schema::{
    LimitsConfig, ListenerConfig, ObservabilityConfig, ResponseConfig, RouteConfig, RouterConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
