//! Shared fixtures for endpoint and server tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use democracy_check::config::ServiceConfig;
use democracy_check::data::{FileSource, ReferenceStore};
use democracy_check::http::HttpServer;
use democracy_check::routing::Mount;

pub const COUNTRIES: &str = r#"{
    "US": "United States",
    "NO": "Norway",
    "FR": "France",
    "AQ": "Antarctica",
    "XX": "Corruptland"
}"#;

pub const DEMOCRACIES: &str = r#"[
    {"country": "Norway", "democracyCountries_score2024": "9.81", "democracyCountries_category": "Full democracy"},
    {"country": "United States", "democracyCountries_score2024": "7.5", "democracyCountries_category": "Flawed democracy"},
    {"country": "France", "democracyCountries_score2024": "8.01", "democracyCountries_category": "Full democracy"},
    {"country": "Corruptland", "democracyCountries_score2024": "n/a", "democracyCountries_category": "Hybrid regime"}
]"#;

/// Temporary data directory holding the given tables. `None` leaves a table out.
pub fn data_dir(countries: Option<&str>, democracies: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    if let Some(content) = countries {
        std::fs::write(dir.path().join("countries.json"), content).unwrap();
    }
    if let Some(content) = democracies {
        std::fs::write(dir.path().join("democracies.json"), content).unwrap();
    }
    dir
}

/// Unloaded store reading from `dir`.
pub fn store_in(dir: &Path) -> Arc<ReferenceStore> {
    Arc::new(ReferenceStore::new(Arc::new(FileSource::new(dir))))
}

/// Router serving the endpoint at the root, as the hosting platform invokes it.
pub fn endpoint_router(store: Arc<ReferenceStore>) -> Router {
    HttpServer::with_mount(ServiceConfig::default(), store, Mount::Direct).router()
}

/// Router mounted the way the standalone listener mounts it.
pub fn mounted_router(store: Arc<ReferenceStore>, custom_domain: bool) -> Router {
    let mut config = ServiceConfig::default();
    config.function.custom_domain = custom_domain;
    HttpServer::new(config, store).router()
}

/// GET request with the given headers.
pub fn get(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Send one request through `router` and collect the response.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}
