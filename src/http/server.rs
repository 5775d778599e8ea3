//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the endpoint handler
//! - Wire up middleware (header snapshot, tracing, request ID)
//! - Bind server to listener
//! - Stop accepting on the shutdown broadcast

use axum::{middleware, routing::any, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::data::ReferenceStore;
use crate::http::{endpoint, request::capture_incoming_headers};
use crate::observability::tracing::RequestSpan;
use crate::routing::{Dispatcher, Mount};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReferenceStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub mount: Arc<Mount>,
}

/// HTTP server for the democracy endpoint.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server mounted under `/{function}` as the standalone listener does.
    pub fn new(config: ServiceConfig, store: Arc<ReferenceStore>) -> Self {
        let mount = Mount::for_function(&config.function.name, config.function.custom_domain);
        Self::with_mount(config, store, mount)
    }

    /// Create a server with an explicit mount.
    pub fn with_mount(config: ServiceConfig, store: Arc<ReferenceStore>, mount: Mount) -> Self {
        let state = AppState {
            store,
            dispatcher: Arc::new(Dispatcher::new(&config.function.name)),
            mount: Arc::new(mount),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// No timeout layer: requests waiting on the first data load wait for it to finish.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(endpoint::handle))
            .route("/", any(endpoint::handle))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    // Outermost, so the snapshot holds only what the client sent.
                    .layer(middleware::map_request(capture_incoming_headers))
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(RequestSpan::new(
                        config.observability.cloud_project.clone(),
                    )))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            function = %self.config.function.name,
            custom_domain = self.config.function.custom_domain,
            "HTTP server starting"
        );
        tracing::info!("URL: http://localhost:{}/{}", addr.port(), self.config.function.name);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
