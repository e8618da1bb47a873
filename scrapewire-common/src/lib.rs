//! Scrapewire Common Library
//!
//! Shared types and utilities for scrapewire exporters:
//!
//! - [`value`] - Loosely-typed snapshot tree (`RawValue`) with safe accessors
//! - [`metric`] - Metric descriptors, samples and naming rules
//! - [`exposition`] - Prometheus text exposition rendering
//! - [`config`] - Logging configuration
//! - [`error`] - Scrape error taxonomy

pub mod config;
pub mod error;
pub mod exposition;
pub mod metric;
pub mod value;

pub use config::{LogFormat, LoggingConfig};
pub use error::ScrapeError;
pub use metric::{MetricDescriptor, MetricKind, MetricSample};
pub use value::{RawSnapshot, RawValue};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Example
///
/// ```ignore
/// use scrapewire_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(
    config: &LoggingConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
    }
}
