//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports valid, addresses parse)
//! - Check that paired settings are set together
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,
    #[error("function.name must not be empty")]
    EmptyFunctionName,
    #[error("function.name must be a single path segment: {0}")]
    NestedFunctionName(String),
    #[error("observability.metrics_address is not a socket address: {0}")]
    InvalidMetricsAddress(String),
    #[error("notify.slack_token and notify.slack_channel must be set together")]
    PartialNotify,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let name = config.function.name.trim_matches('/');
    if name.is_empty() {
        errors.push(ValidationError::EmptyFunctionName);
    } else if name.contains('/') {
        errors.push(ValidationError::NestedFunctionName(config.function.name.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let has_token = config.notify.slack_token.as_deref().is_some_and(|t| !t.is_empty());
    let has_channel = config.notify.slack_channel.as_deref().is_some_and(|c| !c.is_empty());
    if has_token != has_channel {
        errors.push(ValidationError::PartialNotify);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
