//! Request normalization.
//!
//! # Responsibilities
//! - Define the transport-neutral request view (`RawRequest`)
//! - Canonicalize the path into segments and split off the extension
//! - Produce the read-only `Descriptor` every facet is matched against
//!
//! # Design Decisions
//! - Normalization runs once per request, before any route is evaluated
//! - Path cleaning resolves `.` and `..` lexically; `..` never escapes the root
//! - Header names are lowercased (HTTP field names are case-insensitive)

use std::collections::BTreeMap;

/// Multi-valued string mapping (query parameters, headers).
pub type MultiMap = BTreeMap<String, Vec<String>>;

/// Request data as supplied by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub method: String,
    pub host: String,
    pub path: String,
    pub query: MultiMap,
    pub headers: MultiMap,
}

impl RawRequest {
    /// Create a request for `method` and `path` with no host, query or headers.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Append a query value; repeated keys accumulate.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Append a header value; repeated keys accumulate.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Parse an `a=1&b=2` query string into the query multimap.
    pub fn with_query_string(mut self, query: &str) -> Self {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            self.query
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        self
    }
}

/// Normalized, facet-decomposed view of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub segments: Vec<String>,
    pub extension: Option<String>,
    pub method: String,
    pub host: String,
    pub query: MultiMap,
    pub headers: MultiMap,
}

impl Descriptor {
    /// Extension of the last segment, or `""` when there is none.
    pub fn extension_or_empty(&self) -> &str {
        self.extension.as_deref().unwrap_or("")
    }
}

/// Build the descriptor for a raw request.
pub fn normalize(raw: &RawRequest) -> Descriptor {
    let (segments, extension) = split_path(&raw.path);

    let mut headers = MultiMap::new();
    for (key, values) in &raw.headers {
        headers
            .entry(key.to_ascii_lowercase())
            .or_default()
            .extend(values.iter().cloned());
    }

    Descriptor {
        segments,
        extension,
        method: raw.method.clone(),
        host: raw.host.clone(),
        query: raw.query.clone(),
        headers,
    }
}

/// Clean `path` into non-empty segments and split the extension off the last one.
pub fn split_path(path: &str) -> (Vec<String>, Option<String>) {
    let mut segments: Vec<String> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(part.to_string()),
        }
    }

    let mut extension = None;
    if let Some(last) = segments.last_mut() {
        if let Some(index) = last.rfind('.') {
            if index > 0 && index < last.len() - 1 {
                extension = Some(last[index + 1..].to_string());
                last.truncate(index);
            }
        }
    }

    (segments, extension)
}
