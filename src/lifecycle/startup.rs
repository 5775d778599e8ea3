//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start background tasks (chat notifications, metrics exporter)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Reference data is NOT loaded here; the first main-endpoint request loads it
//! - Listener starts last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::data::{FileSource, ReferenceStore};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics, notify::Notifier};

/// Build the reference store for `config` without loading it.
pub fn reference_store(config: &ServiceConfig) -> Arc<ReferenceStore> {
    let dir = config.resolved_data_dir();
    tracing::info!(directory = %dir.display(), "Reference data directory");
    let source = FileSource::from_config(dir, &config.data);
    Arc::new(ReferenceStore::new(Arc::new(source)))
}

/// Install logging and, when configured, the chat notification worker.
pub fn init_observability(config: &ServiceConfig) {
    let notifier = Notifier::from_config(&config.notify);
    let (layer, worker, min_level, unknown_level) = match notifier {
        Some(n) => (Some(n.layer), Some(n.worker), Some(n.min_level), n.unknown_level),
        None => (None, None, None, None),
    };

    logging::init(&config.observability, layer, config.notify.slack_debug);

    let token = if config.notify.slack_token.is_some() { "********" } else { "n/a" };
    tracing::info!(
        channel = config.notify.slack_channel.as_deref().unwrap_or(""),
        level = %config.notify.slack_level,
        token,
        debug = config.notify.slack_debug,
        "Chat notification settings"
    );
    if let Some(level) = unknown_level {
        tracing::warn!(level = %level, "Unknown log level, notifying on errors only");
    }
    if let (Some(worker), Some(level)) = (worker, min_level) {
        tokio::spawn(worker.run());
        tracing::info!(level = %level, "Chat notification hook registered");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }
}

/// Bind, serve until a stop signal, and return.
pub async fn run(config: ServiceConfig) -> Result<(), std::io::Error> {
    tracing::info!(
        port = config.listener.port,
        function = %config.function.name,
        custom_domain = config.function.custom_domain,
        "Configuration loaded"
    );

    let store = reference_store(&config);
    let listener = TcpListener::bind(config.bind_address()).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_watcher(shutdown);

    HttpServer::new(config, store).run(listener, server_shutdown).await
}
