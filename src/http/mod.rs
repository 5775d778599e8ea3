//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request id, trace span)
//!     → endpoint.rs (mount check, dispatch)
//!     → request.rs (country header, response format, header echo)
//!     → [decision engine over the reference store]
//!     → response.rs (plain verdict or HTML page)
//!     → Send to client
//! ```

pub mod endpoint;
pub mod request;
pub mod response;
pub mod server;

pub use request::ResponseFormat;
pub use response::{render, Rendered};
pub use server::{AppState, HttpServer};
