//! Request spans and cloud trace correlation.
//!
//! # Responsibilities
//! - Extract the platform trace id from `X-Cloud-Trace-Context`
//! - Create the per-request span carrying path, request id and trace
//!
//! # Design Decisions
//! - Trace ids are only qualified when a cloud project is configured
//! - Span fields `path` and `trace` are what the chat notifier reports

use axum::http::{HeaderMap, Request};
use tracing::Span;

/// Header carrying `TRACE_ID/SPAN_ID;o=OPTIONS`.
pub const CLOUD_TRACE_HEADER: &str = "x-cloud-trace-context";

/// Fully qualified trace name, e.g. `projects/my-project/traces/abc123`.
pub fn cloud_trace(project: Option<&str>, headers: &HeaderMap) -> Option<String> {
    let project = project.filter(|p| !p.is_empty())?;
    let header = headers.get(CLOUD_TRACE_HEADER)?.to_str().ok()?;
    let trace_id = header.split('/').next().filter(|t| !t.is_empty())?;
    Some(format!("projects/{}/traces/{}", project, trace_id))
}

/// Builds the span wrapping each request.
#[derive(Debug, Clone, Default)]
pub struct RequestSpan {
    project: Option<String>,
}

impl RequestSpan {
    pub fn new(project: Option<String>) -> Self {
        Self { project }
    }
}

impl<B> tower_http::trace::MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");

        let span = tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
            trace = tracing::field::Empty,
        );
        if let Some(trace) = cloud_trace(self.project.as_deref(), request.headers()) {
            span.record("trace", trace.as_str());
        }
        span
    }
}
