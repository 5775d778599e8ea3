//! Metrics collection and exposition.
//!
//! # Metrics
//! - `democracy_requests_total` (counter): requests by route, status
//! - `democracy_request_duration_seconds` (histogram): latency by route
//! - `democracy_verdicts_total` (counter): answers by verdict
//! - `democracy_reference_loads_total` (counter): one-time loads by outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::decision::Verdict;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "democracy_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("democracy_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a rendered verdict.
pub fn record_verdict(verdict: Verdict) {
    ::metrics::counter!("democracy_verdicts_total", "verdict" => verdict.as_str()).increment(1);
}

/// Record the outcome of the one-time reference data load.
pub fn record_load(outcome: &'static str) {
    ::metrics::counter!("democracy_reference_loads_total", "outcome" => outcome).increment(1);
}
