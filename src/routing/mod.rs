//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → matcher.rs Mount (adapter: serve only /{function}[/...])
//!     → router.rs Dispatcher (trim slashes, strip prefix)
//!     → Return: Main | Debug | NotFound
//! ```
//!
//! # Design Decisions
//! - Routes are fixed; no configuration beyond the prefix
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use matcher::{Mount, PrefixMatcher};
pub use router::{Dispatcher, Route, RoutedPath};
