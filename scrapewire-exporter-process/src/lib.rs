//! Prometheus exporter for the resource usage of a single process.
//!
//! CPU and memory come from `sysinfo`; on Linux, file descriptor counts,
//! limits and TCP socket states are read from `/proc`.

pub mod config;
#[cfg(target_os = "linux")]
pub mod linux;
pub mod source;
pub mod table;

pub use config::{ProcessConfig, ProcessExporterConfig};
pub use source::ProcessSource;
pub use table::FIELDS;
