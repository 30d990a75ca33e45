//! Single-value matchers.
//!
//! # Responsibilities
//! - Evaluate one route token against one request value
//! - Bind named captures into a capture sink
//!
//! # Design Decisions
//! - Closed set of matcher kinds; evaluation is an exhaustive match
//! - Only `Named` ever writes to the sink, and only on success
//! - Patterns are unanchored (`{\d+}` matches `a1b`); use `^…$` to anchor

use regex::Regex;
use std::collections::HashMap;

/// Named captures collected from a successful route match.
pub type Args = HashMap<String, String>;

/// A predicate over a single request value.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Exact string equality.
    Literal(String),
    /// Regular expression match without capture.
    Anonymous(Regex),
    /// Regular expression match that binds `name` to the matched value.
    Named { name: String, pattern: Regex },
}

impl Matcher {
    /// Evaluate against `value`, binding a capture into `sink` on success.
    pub fn evaluate(&self, value: &str, sink: &mut Args) -> bool {
        match self {
            Matcher::Literal(expected) => expected == value,
            Matcher::Anonymous(pattern) => pattern.is_match(value),
            Matcher::Named { name, pattern } => {
                if !pattern.is_match(value) {
                    return false;
                }
                sink.insert(name.clone(), value.to_string());
                true
            }
        }
    }
}

// Regex has no PartialEq; two matchers are equal when they were compiled from
// the same source.
impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Matcher::Literal(a), Matcher::Literal(b)) => a == b,
            (Matcher::Anonymous(a), Matcher::Anonymous(b)) => a.as_str() == b.as_str(),
            (
                Matcher::Named { name: na, pattern: pa },
                Matcher::Named { name: nb, pattern: pb },
            ) => na == nb && pa.as_str() == pb.as_str(),
            _ => false,
        }
    }
}

impl Eq for Matcher {}

/// True if any matcher in `set` accepts `value`.
///
/// Stops at the first success. A failed attempt never writes to `sink`, so
/// only the winning matcher's capture is bound.
pub fn evaluate_any(set: &[Matcher], value: &str, sink: &mut Args) -> bool {
    set.iter().any(|m| m.evaluate(value, sink))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, pattern: &str) -> Matcher {
        Matcher::Named {
            name: name.into(),
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    #[test]
    fn test_literal_is_exact() {
        let mut sink = Args::new();
        let m = Matcher::Literal("hello".into());
        assert!(m.evaluate("hello", &mut sink));
        assert!(!m.evaluate("Hello", &mut sink));
        assert!(!m.evaluate("hello2", &mut sink));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_anonymous_never_binds() {
        let mut sink = Args::new();
        let m = Matcher::Anonymous(Regex::new(r"^\d+$").unwrap());
        assert!(m.evaluate("123", &mut sink));
        assert!(!m.evaluate("12a", &mut sink));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_named_binds_only_on_success() {
        let mut sink = Args::new();
        let m = named("id", r"^\d+$");
        assert!(!m.evaluate("abc", &mut sink));
        assert!(sink.is_empty());

        assert!(m.evaluate("42", &mut sink));
        assert_eq!(sink.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_unanchored_pattern() {
        let mut sink = Args::new();
        let m = Matcher::Anonymous(Regex::new("html").unwrap());
        assert!(m.evaluate("text/html;text/css", &mut sink));
    }

    #[test]
    fn test_evaluate_any_binds_winner_only() {
        let mut sink = Args::new();
        let set = vec![named("num", r"^\d+$"), named("word", r"^\w+$")];
        assert!(evaluate_any(&set, "abc", &mut sink));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get("word").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_evaluate_any_empty_set_fails() {
        let mut sink = Args::new();
        assert!(!evaluate_any(&[], "x", &mut sink));
    }
}
