//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the startup configuration: the file at `path` (or defaults),
/// with `bind` overriding `listener.bind_address`. Validation runs after
/// the override so a bad address is reported like any other config error.
pub fn resolve_config(
    path: Option<&Path>,
    bind: Option<String>,
) -> Result<RouterConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RouterConfig::default(),
    };
    if let Some(bind) = bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[listener]
bind_address = "127.0.0.1:3000"

[[routes]]
name = "article"
path = ["article", "{id:^\\d+$}"]
method = ["GET"]
ext = ["", "html"]
query = ["lang", "{lang:^[a-z]{2}$}"]

[routes.response]
body = "article {id} ({lang})"

[[routes]]
name = "accept"
header = ["Accept", "{html}", "Accept", "{\\*/\\*}"]
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].path[1], r"{id:^\d+$}");
        assert_eq!(config.routes[0].response.status, 200);
        assert_eq!(config.routes[1].header.len(), 4);
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_config("routes = 3"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_lists_all() {
        let content = r#"
[[routes]]
name = "bad"
path = ["{(}"]

[[routes]]
name = "odd"
query = ["a"]
"#;
        let err = parse_config(content).unwrap_err();
        match &err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Validation failed: "));
    }

    #[test]
    fn test_bind_override_is_validated() {
        let err = resolve_config(None, Some("nonsense".into())).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(matches!(
                    &errors[..],
                    [ValidationError::BindAddress(addr)] if addr == "nonsense"
                ));
            }
            other => panic!("unexpected error: {other}"),
        }

        let config = resolve_config(None, Some("127.0.0.1:4000".into())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/route-mux.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
