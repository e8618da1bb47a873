//! Prometheus exporter for OpenStack project quotas.
//!
//! The quota numbers are produced by an external script (usually wrapping the
//! OpenStack CLI) that prints a YAML or JSON mapping; the exporter runs it once
//! per pull under the scrape guard.

pub mod config;
pub mod source;
pub mod table;

pub use config::{CommandConfig, OutputFormat, QuotaExporterConfig, QuotaSchema};
pub use source::CommandSource;
pub use table::{FIELDS, LEGACY_FIELDS};
