//! Path prefix matching.
//!
//! # Responsibilities
//! - Normalize a configured prefix (slashes trimmed)
//! - Strip the prefix from a slash-trimmed request path
//! - Map raw request paths at the hosting adapter boundary
//!
//! # Design Decisions
//! - Matching is case-sensitive and segment-aligned ("fn" never matches "fnx")
//! - Empty prefix = always matches, strips nothing

/// A leading path segment to strip before routing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrefixMatcher {
    prefix: String,
}

impl PrefixMatcher {
    /// Create a new prefix matcher. Leading and trailing slashes are ignored.
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix.as_ref().trim_matches('/').to_string(),
        }
    }

    /// The normalized prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Strip the prefix from an already slash-trimmed path.
    ///
    /// Paths that are not under the prefix are returned unchanged.
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        if self.prefix.is_empty() {
            return path;
        }
        if path == self.prefix {
            return "";
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if rest.starts_with('/') => &rest[1..],
            _ => path,
        }
    }
}

/// How the listener hands paths to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount {
    /// The platform already delivers endpoint-relative paths.
    Direct,
    /// Only `/{name}` and `/{name}/...` are served; the prefix is removed first.
    StripPrefix(String),
    /// Only `/{name}` and `/{name}/...` are served; paths pass through whole.
    PassThrough(String),
}

impl Mount {
    /// Mount for a function served by the standalone listener.
    pub fn for_function(name: &str, custom_domain: bool) -> Self {
        let name = name.trim_matches('/').to_string();
        if custom_domain {
            Mount::PassThrough(name)
        } else {
            Mount::StripPrefix(name)
        }
    }

    /// Map a raw request path to the path the endpoint sees.
    ///
    /// Returns `None` for paths outside the mount.
    pub fn map<'a>(&self, path: &'a str) -> Option<&'a str> {
        let name = match self {
            Mount::Direct => return Some(path),
            Mount::StripPrefix(name) | Mount::PassThrough(name) => name,
        };

        let rest = path.strip_prefix('/')?.strip_prefix(name.as_str())?;
        let stripped = if rest.is_empty() {
            rest
        } else {
            rest.strip_prefix('/')?
        };

        match self {
            Mount::StripPrefix(_) => Some(stripped),
            _ => Some(path),
        }
    }
}
