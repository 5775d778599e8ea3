//! Endpoint handlers.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::time::Instant;

use crate::decision::decide;
use crate::http::request::{country_code, decoded_path, header_map, IncomingHeaders, ResponseFormat};
use crate::http::response::{self, internal_error, not_found};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::Route;

/// Entry point for every request.
pub async fn handle(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (parts, _) = request.into_parts();
    let original = decoded_path(parts.uri.path());
    tracing::info!(path = %original, "Original path");

    let Some(mapped) = state.mount.map(&original) else {
        tracing::info!(path = %original, "Outside of the function mount");
        metrics::record_request("outside", StatusCode::NOT_FOUND.as_u16(), start);
        return not_found();
    };

    let routed = state.dispatcher.route(mapped);
    let suffix = if routed.trailing_slash { "/" } else { "" };
    tracing::info!(
        path = %routed.path,
        suffix,
        route = routed.route.as_str(),
        "Routed request"
    );

    let response = match routed.route {
        Route::Main => main_endpoint(&state, &parts.headers, parts.uri.query()).await,
        Route::Debug => {
            let incoming = parts.extensions.get::<IncomingHeaders>();
            debug_endpoint(incoming.map_or(&parts.headers, |h| &h.0))
        }
        Route::NotFound => not_found(),
    };

    metrics::record_request(routed.route.as_str(), response.status().as_u16(), start);
    response
}

/// The verdict for the visitor's country.
async fn main_endpoint(state: &AppState, headers: &HeaderMap, query: Option<&str>) -> Response {
    let data = match state.store.ensure_loaded().await {
        Ok(data) => data,
        Err(e) => {
            let store_state = state.store.state();
            tracing::error!(stage = %e.stage, state = ?store_state, "There is no {} data", e.stage);
            return internal_error(&e);
        }
    };

    let code = country_code(headers);
    tracing::info!(country_code = %code, "Country code");

    let result = match decide(data, &code) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(country = %e.country, error = %e, "Could not parse democracy score");
            return internal_error(&e);
        }
    };
    tracing::info!(
        country_name = %result.country_name,
        found = result.found,
        score = result.score,
        verdict = result.verdict.as_str(),
        "Decided"
    );
    metrics::record_verdict(result.verdict);

    response::render(&result, ResponseFormat::from_query(query)).into_response()
}

/// Echo the incoming headers as JSON.
fn debug_endpoint(headers: &HeaderMap) -> Response {
    let payload = serde_json::json!({ "headers": header_map(headers) });
    (StatusCode::OK, Json(payload)).into_response()
}
