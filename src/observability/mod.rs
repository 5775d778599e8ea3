//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, text or JSON)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (request spans with request id and cloud trace)
//!
//! Consumers:
//!     → stdout (platform log collection)
//!     → notify.rs (warning/error events posted to a chat channel)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID and cloud trace flow through the request span
//! - Chat posting happens off the request path
//! - Metrics are cheap (no-ops until an exporter is installed)

pub mod logging;
pub mod metrics;
pub mod notify;
pub mod tracing;
