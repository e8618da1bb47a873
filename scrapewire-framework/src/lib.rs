//! Scrapewire Exporter Framework
//!
//! The scrape-and-publish harness every scrapewire exporter is built on:
//!
//! - [`Source`] - obtains one raw snapshot per fetch
//! - [`FieldTable`] - declarative mapping from a snapshot to metric samples
//! - [`Exporter`] - runs one guarded fetch-map-render cycle per pull and
//!   accounts for failures
//! - [`HttpServer`] - the pull endpoint
//! - [`ExporterRunner`] - logging, fatal bind, signal handling
//! - [`ExporterConfig`] / [`ExporterArgs`] - JSON5 config with CLI overrides
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use scrapewire_framework::{ExporterArgs, ExporterConfig, ExporterRunner};
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     common: ExporterArgs,
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cli = Cli::parse();
//!     let config = MyConfig::resolve_with(&cli.common, |_| {})?;
//!     let runner = ExporterRunner::new("my-exporter", &config, &cli.common)?;
//!     runner.run(MySource::new(&config), MY_FIELDS).await?;
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod config;
pub mod error;
pub mod exporter;
pub mod http;
pub mod mapper;
pub mod runner;
pub mod source;

pub use args::ExporterArgs;
pub use config::{ExporterConfig, ServerConfig};
pub use error::{ExporterError, Result};
pub use exporter::{Collector, Cycle, Exporter, ExporterStats, SharedCollector};
pub use http::{HttpServer, create_router};
pub use mapper::{ConnectionCounts, Extract, FieldSpec, FieldTable, classify_connections};
pub use runner::ExporterRunner;
pub use source::Source;

// Re-export commonly used items from scrapewire-common
pub use scrapewire_common::{
    LogFormat, LoggingConfig, MetricDescriptor, MetricKind, MetricSample, RawSnapshot, RawValue,
    ScrapeError,
};

// Re-export async_trait so exporters can implement Source without naming it
pub use async_trait::async_trait;
