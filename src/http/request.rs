//! Request inspection.
//!
//! # Responsibilities
//! - Resolve the visitor's country code from platform headers
//! - Select the response format from the query string
//! - Present the incoming header set for introspection
//! - Decode the request path before routing
//!
//! # Design Decisions
//! - Header priority is fixed: explicit override first, then platform geolocation
//! - Unknown or malformed query strings fall back to HTML

use axum::extract::Request;
use axum::http::{header, HeaderMap};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Explicit country header, set by fronting proxies or tests.
pub const COUNTRY_CODE_HEADER: &str = "x-country-code";

/// Geolocation header set by the hosting platform.
pub const APPENGINE_COUNTRY_HEADER: &str = "x-appengine-country";

/// Candidate country headers, in priority order.
pub const COUNTRY_HEADERS: [&str; 2] = [COUNTRY_CODE_HEADER, APPENGINE_COUNTRY_HEADER];

/// First non-empty country header value, or an empty string.
pub fn country_code(headers: &HeaderMap) -> String {
    for name in COUNTRY_HEADERS {
        let value = header_value(headers, name);
        tracing::info!(header = name, value = %value, "Country header");
    }

    COUNTRY_HEADERS
        .iter()
        .map(|name| header_value(headers, name))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Body format of the main endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Bare verdict, `text/plain`.
    Plain,
    /// Explanatory page, `text/html`.
    #[default]
    Html,
}

impl ResponseFormat {
    /// `mode=plain` selects plain text; anything else is HTML.
    pub fn from_query(query: Option<&str>) -> Self {
        let mode = query.and_then(|q| {
            q.split('&')
                .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
                .find(|(key, _)| *key == "mode")
                .map(|(_, value)| value)
        });
        match mode {
            Some("plain") => ResponseFormat::Plain,
            _ => ResponseFormat::Html,
        }
    }
}

/// Header name in `Title-Case`, e.g. `x-test` becomes `X-Test`.
pub fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// Headers as the client sent them, before any middleware adds its own.
#[derive(Debug, Clone)]
pub struct IncomingHeaders(pub HeaderMap);

/// Store a copy of the request headers in the request extensions.
pub async fn capture_incoming_headers(mut request: Request) -> Request {
    let snapshot = IncomingHeaders(request.headers().clone());
    request.extensions_mut().insert(snapshot);
    request
}

/// All headers keyed by canonical name, values in arrival order.
///
/// `Host` is part of the request target rather than the header set and is left out.
pub fn header_map(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        if name == header::HOST {
            continue;
        }
        map.entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    map
}

/// Percent-decoded request path. Invalid UTF-8 is replaced rather than rejected.
pub fn decoded_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}
