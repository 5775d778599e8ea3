//! "Do I live in a democracy?" as an HTTP function.
//!
//! Maps the visitor's country header to a country name, looks the name up in
//! a democracy index table, and answers Yes, No or Unknown.

pub mod config;
pub mod data;
pub mod decision;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ServiceConfig;
pub use data::ReferenceStore;
pub use decision::{decide, DecisionResult, Verdict};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
