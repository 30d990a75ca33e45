//! Error types for route registration and handler execution.

use thiserror::Error;

/// Boxed error accepted from handler code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building or registering a route.
///
/// These are registration-time errors only; a committed route never fails
/// during matching.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid pattern in token `{token}`: {source}")]
    PatternCompile {
        token: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid route argument: {0}")]
    Argument(String),
}

/// Error returned by a request handler.
#[derive(Debug, Error)]
#[error("handler failed: {source}")]
pub struct HandlerError {
    #[source]
    source: BoxError,
}

impl HandlerError {
    /// Wrap any error produced by handler code.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Build an error from a plain message.
    pub fn msg(message: impl std::fmt::Display) -> Self {
        Self::new(message.to_string())
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_display() {
        let err = HandlerError::msg("boom");
        assert_eq!(err.to_string(), "handler failed: boom");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_pattern_error_names_token() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = RouteError::PatternCompile {
            token: "{(}".into(),
            source,
        };
        assert!(err.to_string().contains("`{(}`"));
    }
}
