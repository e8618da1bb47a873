//! Prometheus exporter for EOS mount accessibility.
//!
//! Publishes a single `status` gauge: 0 when a probe file could be written
//! and removed, otherwise the [`ProbeStatus`] code of the failing step.

pub mod config;
pub mod source;

pub use config::{EosExporterConfig, ProbeConfig};
pub use source::{PathProbeSource, ProbeStatus, probe};

use scrapewire_framework::FieldSpec;

pub static FIELDS: &[FieldSpec] = &[FieldSpec::gauge(
    "status",
    "status",
    "EOS probe status: 0 ok, 1 no access, 2 write failed, 3 close failed",
)];
