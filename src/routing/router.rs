//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Trim slashes and strip the configured prefix
//! - Resolve the endpoint path to a route
//! - Return an explicit NotFound rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - The trailing slash is recorded but never affects routing

use crate::routing::matcher::PrefixMatcher;

/// The endpoints this service answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The verdict page.
    Main,
    /// Header introspection.
    Debug,
    NotFound,
}

impl Route {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Main => "main",
            Route::Debug => "debug",
            Route::NotFound => "not_found",
        }
    }
}

/// Outcome of dispatching one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedPath {
    pub route: Route,
    /// The path after trimming and prefix stripping.
    pub path: String,
    /// Whether the incoming path ended in `/`.
    pub trailing_slash: bool,
}

/// Maps endpoint paths to routes.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    prefix: PrefixMatcher,
}

impl Dispatcher {
    /// Create a dispatcher that quietly strips `prefix`.
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: PrefixMatcher::new(prefix),
        }
    }

    /// Resolve `path` to a route.
    pub fn route(&self, path: &str) -> RoutedPath {
        let trailing_slash = path.ends_with('/');
        let trimmed = path.trim_matches('/');
        let stripped = self.prefix.strip(trimmed);

        let route = match stripped {
            "" => Route::Main,
            "_debug" => Route::Debug,
            _ => Route::NotFound,
        };

        tracing::debug!(
            original = path,
            prefix = self.prefix.prefix(),
            path = stripped,
            trailing_slash,
            route = route.as_str(),
            "Dispatched path"
        );

        RoutedPath {
            route,
            path: stripped.to_string(),
            trailing_slash,
        }
    }
}
