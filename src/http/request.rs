//! Request conversion.
//!
//! # Responsibilities
//! - Extract routing-relevant information (method, host, path, query, headers)
//! - Build the transport-neutral `RawRequest` the dispatcher consumes
//!
//! # Design Decisions
//! - Host comes from the `Host` header, falling back to the URI authority
//!   (HTTP/2 requests carry it as `:authority`)
//! - Header values that are not visible ASCII are decoded lossily rather
//!   than dropped, so a key is never silently missing
//! - The path is percent-decoded before routing; tokens compare against
//!   the characters the client meant, and `%2e%2e` is cleaned like `..`

use axum::http::request::Parts;
use percent_encoding::percent_decode_str;

use crate::routing::{MultiMap, RawRequest};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Build a `RawRequest` from HTTP request parts.
pub fn raw_request(parts: &Parts) -> RawRequest {
    let host = parts
        .headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default();

    let mut headers = MultiMap::new();
    for (name, value) in &parts.headers {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    let raw = RawRequest {
        method: parts.method.to_string(),
        host,
        path: percent_decode_str(parts.uri.path())
            .decode_utf8_lossy()
            .into_owned(),
        headers,
        ..Default::default()
    };

    match parts.uri.query() {
        Some(query) => raw.with_query_string(query),
        None => raw,
    }
}
