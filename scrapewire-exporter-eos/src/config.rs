//! Configuration for the EOS exporter.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use scrapewire_framework::{ExporterConfig, ExporterError, LoggingConfig, ServerConfig};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EosExporterConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub probe: ProbeConfig,
}

/// Directory to probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub path: PathBuf,
}

impl ExporterConfig for EosExporterConfig {
    fn default_listen(&self) -> &'static str {
        ":18000"
    }

    fn default_namespace(&self) -> &'static str {
        "eos"
    }

    fn server(&self) -> &ServerConfig {
        &self.server
    }

    fn server_mut(&mut self) -> &mut ServerConfig {
        &mut self.server
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn validate(&self) -> scrapewire_framework::Result<()> {
        self.server.validate()?;
        if self.probe.path.as_os_str().is_empty() {
            return Err(ExporterError::validation("probe.path is required"));
        }
        Ok(())
    }
}
