//! Route token compilation.
//!
//! Token grammar:
//! ```text
//! literal        exact match
//! {regex}        pattern match, no capture
//! {name:regex}   pattern match, binds `name` to the matched value
//! ```
//!
//! The name separator is the first `:` inside the braces, and only when it is
//! neither the first nor the last character. `{:x}` and `{x:}` are therefore
//! anonymous patterns over `:x` and `x:`.

use regex::Regex;

use crate::routing::error::RouteError;
use crate::routing::matcher::Matcher;

/// Compile a single route token.
pub fn compile(token: &str) -> Result<Matcher, RouteError> {
    let inner = match token
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(inner) => inner,
        None => return Ok(Matcher::Literal(token.to_string())),
    };

    let regex = |source: &str| {
        Regex::new(source).map_err(|source| RouteError::PatternCompile {
            token: token.to_string(),
            source,
        })
    };

    match inner.find(':') {
        Some(index) if index > 0 && index < inner.len() - 1 => Ok(Matcher::Named {
            name: inner[..index].to_string(),
            pattern: regex(&inner[index + 1..])?,
        }),
        _ => Ok(Matcher::Anonymous(regex(inner)?)),
    }
}

/// Compile every token, preserving order.
pub fn compile_all<I, S>(tokens: I) -> Result<Vec<Matcher>, RouteError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens.into_iter().map(|t| compile(t.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_kinds() {
        assert_eq!(compile("hello").unwrap(), Matcher::Literal("hello".into()));
        assert_eq!(
            compile(r"{^\d+$}").unwrap(),
            Matcher::Anonymous(Regex::new(r"^\d+$").unwrap())
        );
        assert_eq!(
            compile(r"{num:^\d+$}").unwrap(),
            Matcher::Named {
                name: "num".into(),
                pattern: Regex::new(r"^\d+$").unwrap()
            }
        );
    }

    #[test]
    fn test_half_braced_is_literal() {
        assert_eq!(compile("{abc").unwrap(), Matcher::Literal("{abc".into()));
        assert_eq!(compile("abc}").unwrap(), Matcher::Literal("abc}".into()));
        assert_eq!(compile("{").unwrap(), Matcher::Literal("{".into()));
        assert_eq!(compile("").unwrap(), Matcher::Literal("".into()));
    }

    #[test]
    fn test_colon_at_edges_is_anonymous() {
        let m = compile("{:x}").unwrap();
        assert!(matches!(&m, Matcher::Anonymous(re) if re.as_str() == ":x"));

        let m = compile("{x:}").unwrap();
        assert!(matches!(&m, Matcher::Anonymous(re) if re.as_str() == "x:"));
    }

    #[test]
    fn test_name_splits_on_first_colon() {
        let m = compile("{a:b:c}").unwrap();
        assert!(matches!(
            &m,
            Matcher::Named { name, pattern } if name == "a" && pattern.as_str() == "b:c"
        ));
    }

    #[test]
    fn test_colon_in_regex_needs_a_name() {
        let m = compile(r"{h:^127\.0\.0\.1(:\d+)?$}").unwrap();
        let mut sink = Default::default();
        assert!(m.evaluate("127.0.0.1:8080", &mut sink));
        assert_eq!(sink["h"], "127.0.0.1:8080");

        // Without a name the first colon splits the group apart.
        assert!(compile(r"{^127\.0\.0\.1(:\d+)?$}").is_err());
    }

    #[test]
    fn test_empty_braces_match_anything() {
        let m = compile("{}").unwrap();
        let mut sink = Default::default();
        assert!(m.evaluate("whatever", &mut sink));
    }

    #[test]
    fn test_invalid_pattern_fails() {
        let err = compile("{id:(}").unwrap_err();
        assert!(matches!(err, RouteError::PatternCompile { ref token, .. } if token == "{id:(}"));
        assert!(compile("{[a-}").is_err());
    }

    #[test]
    fn test_compile_all_preserves_order() {
        let all = compile_all(["hello", r"{^\d+$}", r"{num:^\d+$}"]).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], Matcher::Literal("hello".into()));
        assert!(matches!(&all[2], Matcher::Named { name, .. } if name == "num"));
    }

    #[test]
    fn test_compile_all_stops_on_error() {
        assert!(compile_all(["ok", "{(}", "never"]).is_err());
    }
}
