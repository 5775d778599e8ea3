//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level at runtime (`RUST_LOG`)
//! - Attach the chat notification layer when configured
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, text format for development
//! - `RUST_LOG` filters the log output only; the chat layer has its own level

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    filter::{filter_fn, Directive},
    layer::SubscriberExt,
    registry::Registry,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::observability::notify::NotifyLayer;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "democracy_check=info,tower_http=info";

/// Directive that shows the chat client's own request logging.
const NOTIFY_DEBUG_DIRECTIVE: &str = "democracy_check::observability::notify=debug";

/// Log output filter from `RUST_LOG`, widened for chat post tracing when asked.
pub fn env_filter(notify_debug: bool) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    with_notify_debug(filter, notify_debug)
}

fn with_notify_debug(filter: EnvFilter, notify_debug: bool) -> EnvFilter {
    if !notify_debug {
        return filter;
    }
    match NOTIFY_DEBUG_DIRECTIVE.parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Build the subscriber: filtered log output plus the chat layer.
///
/// The chat layer sees every span, so request context is available to it,
/// and every event at or above its own minimum level.
pub fn subscriber(
    config: &ObservabilityConfig,
    filter: EnvFilter,
    notify: Option<NotifyLayer>,
) -> impl Subscriber + Send + Sync + 'static {
    let output: Box<dyn Layer<Registry> + Send + Sync> = match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed(),
    };

    let notify = notify.map(|layer| {
        let min_level: Level = layer.min_level();
        layer.with_filter(filter_fn(move |metadata| {
            metadata.is_span() || *metadata.level() <= min_level
        }))
    });

    tracing_subscriber::registry()
        .with(output.with_filter(filter))
        .with(notify)
}

/// Install the global subscriber.
pub fn init(config: &ObservabilityConfig, notify: Option<NotifyLayer>, notify_debug: bool) {
    subscriber(config, env_filter(notify_debug), notify).init();
}
