//! Routes and the route builder.
//!
//! # Responsibilities
//! - Hold the per-facet matcher sets of a route
//! - Evaluate a route against a request descriptor
//! - Accumulate tokens in a mutable builder and freeze them on commit
//!
//! # Design Decisions
//! - Facets are evaluated in a fixed order: method, host, path, extension,
//!   query, headers; the first failing facet aborts
//! - Captures go to a scratch map that is merged only when every facet passes
//! - The builder owns its route by value; commit clones it, so a committed
//!   route is unaffected by any later builder mutation
//! - Query and header facets require every listed key, and accept a key when
//!   any of its observed values matches any of its matchers

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::routing::descriptor::{Descriptor, MultiMap};
use crate::routing::error::RouteError;
use crate::routing::handler::Handler;
use crate::routing::matcher::{evaluate_any, Args, Matcher};
use crate::routing::pattern::{compile, compile_all};
use crate::routing::table::{RouteId, RouteTable};

/// An immutable conjunction of facet predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    name: Option<String>,
    paths: Vec<Matcher>,
    methods: Vec<Matcher>,
    exts: Vec<Matcher>,
    hosts: Vec<Matcher>,
    queries: BTreeMap<String, Vec<Matcher>>,
    headers: BTreeMap<String, Vec<Matcher>>,
}

impl Route {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of path segments this route requires.
    pub fn arity(&self) -> usize {
        self.paths.len()
    }

    /// Evaluate the route against `descriptor`.
    ///
    /// On success the route's captures are merged into `args` (later facets
    /// overwrite earlier ones on a name clash). On failure `args` is untouched.
    pub fn matches(&self, descriptor: &Descriptor, args: &mut Args) -> bool {
        let mut scratch = Args::new();

        if !self.methods.is_empty()
            && !evaluate_any(&self.methods, &descriptor.method, &mut scratch)
        {
            return false;
        }

        if !self.hosts.is_empty() && !evaluate_any(&self.hosts, &descriptor.host, &mut scratch) {
            return false;
        }

        if self.paths.len() != descriptor.segments.len() {
            return false;
        }
        for (matcher, segment) in self.paths.iter().zip(&descriptor.segments) {
            if !matcher.evaluate(segment, &mut scratch) {
                return false;
            }
        }

        if !self.exts.is_empty()
            && !descriptor.segments.is_empty()
            && !evaluate_any(&self.exts, descriptor.extension_or_empty(), &mut scratch)
        {
            return false;
        }

        if !multimap_matches(&self.queries, &descriptor.query, &mut scratch) {
            return false;
        }

        if !multimap_matches(&self.headers, &descriptor.headers, &mut scratch) {
            return false;
        }

        args.extend(scratch);
        true
    }
}

/// AND over required keys, OR over observed values per key.
fn multimap_matches(
    required: &BTreeMap<String, Vec<Matcher>>,
    observed: &MultiMap,
    scratch: &mut Args,
) -> bool {
    required.iter().all(|(key, matchers)| {
        observed
            .get(key)
            .is_some_and(|values| values.iter().any(|v| evaluate_any(matchers, v, scratch)))
    })
}

/// Mutable route under construction.
///
/// Cloning a builder branches it: both copies share the tokens added so far
/// and evolve independently afterwards.
#[derive(Clone)]
pub struct RouteBuilder {
    table: Arc<RouteTable>,
    route: Route,
}

impl std::fmt::Debug for RouteBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteBuilder")
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

impl RouteBuilder {
    /// Create an empty builder that commits into `table`.
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            route: Route::default(),
        }
    }

    /// Name used for this route in logs and metrics.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.route.name = Some(name.into());
        self
    }

    /// Append path segment tokens. Order is significant.
    pub fn path<I, S>(&mut self, tokens: I) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.route.paths.extend(compile_all(tokens)?);
        Ok(self)
    }

    /// Append accepted request method tokens.
    pub fn method<I, S>(&mut self, tokens: I) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.route.methods.extend(compile_all(tokens)?);
        Ok(self)
    }

    pub fn get(&mut self) -> &mut Self {
        self.literal_method("GET")
    }

    pub fn post(&mut self) -> &mut Self {
        self.literal_method("POST")
    }

    pub fn put(&mut self) -> &mut Self {
        self.literal_method("PUT")
    }

    pub fn delete(&mut self) -> &mut Self {
        self.literal_method("DELETE")
    }

    fn literal_method(&mut self, method: &str) -> &mut Self {
        self.route.methods.push(Matcher::Literal(method.to_string()));
        self
    }

    /// Append accepted extension tokens. `""` accepts a request without extension.
    pub fn ext<I, S>(&mut self, tokens: I) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.route.exts.extend(compile_all(tokens)?);
        Ok(self)
    }

    /// Append accepted host tokens.
    pub fn host<I, S>(&mut self, tokens: I) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.route.hosts.extend(compile_all(tokens)?);
        Ok(self)
    }

    /// Append query constraints as flat `key, value, key, value, …` tokens.
    ///
    /// Keys are literal; values follow the token grammar. Repeating a key adds
    /// alternatives for that key.
    pub fn query<I, S>(&mut self, pairs: I) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = compile_pairs("query", pairs, |k| k.to_string())?;
        merge_pairs(&mut self.route.queries, compiled);
        Ok(self)
    }

    /// Append header constraints as flat `key, value, …` tokens.
    ///
    /// Header names are matched case-insensitively.
    pub fn header<I, S>(&mut self, pairs: I) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = compile_pairs("header", pairs, |k| k.to_ascii_lowercase())?;
        merge_pairs(&mut self.route.headers, compiled);
        Ok(self)
    }

    /// Frozen copy of the route as currently built.
    pub fn snapshot(&self) -> Route {
        self.route.clone()
    }

    /// Register a snapshot of the current route with `handler`.
    ///
    /// The builder stays usable; each commit registers an independent route.
    pub fn commit<H: Handler>(&self, handler: H) -> RouteId {
        self.table.register(self.snapshot(), Arc::new(handler))
    }
}

// Validates and compiles the whole call before anything is merged, so a failed
// call leaves the builder unchanged.
fn compile_pairs<I, S>(
    facet: &str,
    pairs: I,
    key_of: impl Fn(&str) -> String,
) -> Result<Vec<(String, Matcher)>, RouteError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens: Vec<S> = pairs.into_iter().collect();
    if tokens.len() % 2 != 0 {
        return Err(RouteError::Argument(format!(
            "{facet} expects key/value pairs, got {} tokens",
            tokens.len()
        )));
    }

    tokens
        .chunks(2)
        .map(|pair| {
            let key = pair[0].as_ref();
            if key.is_empty() {
                return Err(RouteError::Argument(format!("{facet} key must not be empty")));
            }
            Ok((key_of(key), compile(pair[1].as_ref())?))
        })
        .collect()
}

fn merge_pairs(map: &mut BTreeMap<String, Vec<Matcher>>, pairs: Vec<(String, Matcher)>) {
    for (key, matcher) in pairs {
        map.entry(key).or_default().push(matcher);
    }
}
