//! HTTP server for the pull endpoint.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use scrapewire_common::exposition::CONTENT_TYPE;

use crate::error::{ExporterError, Result};
use crate::exporter::SharedCollector;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    collector: SharedCollector,
}

/// Create the HTTP router.
pub fn create_router(collector: SharedCollector, metrics_path: &str) -> Router {
    let state = AppState { collector };

    Router::new()
        .route(metrics_path, get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for the metrics endpoint.
///
/// The cycle runs on its own task so a client that goes away does not
/// cancel a fetch in flight. Always answers 200; a cycle that dies
/// publishes an empty exposition.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let collector = state.collector.clone();

    let body = match tokio::spawn(async move { collector.render().await }).await {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "Scrape task failed");
            String::new()
        }
    };

    (StatusCode::OK, [("content-type", CONTENT_TYPE)], body).into_response()
}

/// Handler for the /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// HTTP server bound to its listen address.
pub struct HttpServer {
    collector: SharedCollector,
    listener: TcpListener,
    listen_addr: SocketAddr,
    metrics_path: String,
}

impl HttpServer {
    /// Bind the listen address.
    ///
    /// Failing to bind is fatal for an exporter, so this is separate from
    /// [`run`](Self::run).
    pub async fn bind(
        collector: SharedCollector,
        listen_addr: SocketAddr,
        metrics_path: impl Into<String>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(listen_addr)
            .await
            .map_err(|source| ExporterError::Bind {
                addr: listen_addr.to_string(),
                source,
            })?;

        let listen_addr = listener.local_addr()?;

        Ok(Self {
            collector,
            listener,
            listen_addr,
            metrics_path: metrics_path.into(),
        })
    }

    /// The bound address (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Run the HTTP server until the shutdown signal is received.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let router = create_router(self.collector, &self.metrics_path);

        info!(
            addr = %self.listen_addr,
            path = %self.metrics_path,
            "HTTP server listening"
        );

        axum::serve(self.listener, router)
            .with_graceful_shutdown(async move {
                loop {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                    if *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| ExporterError::Server(e.to_string()))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
