//! Exporter runner for lifecycle management.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use scrapewire_common::init_tracing;

use crate::args::ExporterArgs;
use crate::config::{ExporterConfig, ServerConfig};
use crate::error::{ExporterError, Result};
use crate::exporter::{Exporter, SharedCollector};
use crate::http::HttpServer;
use crate::mapper::FieldSpec;
use crate::source::Source;

/// Runner that manages the lifecycle of one exporter process.
///
/// Handles:
/// - Logging initialization (with CLI overrides)
/// - Binding the listen address (fatal on failure)
/// - Serving the pull endpoint
/// - Graceful shutdown on Ctrl+C or SIGTERM
///
/// # Example
///
/// ```ignore
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let cli = Cli::parse();
///     let config = EosConfig::resolve_with(&cli.common, |_| {})?;
///
///     let runner = ExporterRunner::new("scrapewire-exporter-eos", &config, &cli.common)?;
///     let source = PathProbeSource::new(&config.probe.path);
///
///     runner.run(source, FIELDS).await?;
///     Ok(())
/// }
/// ```
pub struct ExporterRunner {
    name: String,
    server: ServerConfig,
}

impl ExporterRunner {
    /// Create a runner and initialize logging.
    pub fn new<C: ExporterConfig>(
        name: impl Into<String>,
        config: &C,
        args: &ExporterArgs,
    ) -> Result<Self> {
        let name = name.into();
        let version = env!("CARGO_PKG_VERSION");

        let log_config = config
            .logging()
            .clone()
            .with_overrides(args.log_level.as_deref(), args.verbose);

        init_tracing(&log_config).map_err(|e| ExporterError::config(e.to_string()))?;

        tracing::info!(exporter = %name, version = %version, "Starting exporter");

        Ok(Self {
            name,
            server: config.server().clone(),
        })
    }

    /// Serve `source` through `fields` until a shutdown signal arrives.
    pub async fn run<S: Source>(self, source: S, fields: &[FieldSpec]) -> Result<()> {
        tracing::info!(
            source = %source.describe(),
            namespace = %self.server.namespace,
            fields = fields.len(),
            "Exporter configured"
        );

        let exporter = Arc::new(Exporter::new(&self.server.namespace, source, fields));
        let collector: SharedCollector = exporter.clone();

        let listen_addr = self.server.listen_addr()?;
        let server = HttpServer::bind(collector, listen_addr, self.server.path.clone()).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut http_task = tokio::spawn(server.run(shutdown_rx));

        tokio::select! {
            result = shutdown_signal() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for shutdown signals");
                }
            }
            joined = &mut http_task => {
                return match joined {
                    Ok(result) => result,
                    Err(e) => Err(ExporterError::Server(e.to_string())),
                };
            }
        }

        tracing::info!(exporter = %self.name, "Received shutdown signal");

        let _ = shutdown_tx.send(true);

        match tokio::time::timeout(Duration::from_secs(5), http_task).await {
            Ok(Ok(Err(e))) => tracing::warn!(error = %e, "HTTP server error during shutdown"),
            Err(_) => tracing::warn!("HTTP server did not stop within 5s"),
            _ => {}
        }

        let stats = exporter.stats();
        tracing::info!(
            scrapes = stats.scrapes,
            failures = stats.failures,
            "Final statistics"
        );

        tracing::info!(exporter = %self.name, "Exporter stopped");
        Ok(())
    }
}

/// Wait for Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = sigterm.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
