//! Configuration for the process exporter.

use serde::{Deserialize, Serialize};

use scrapewire_framework::{ExporterConfig, ExporterError, LoggingConfig, ServerConfig};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessExporterConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub process: ProcessConfig,
}

/// The monitored process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Process id, required.
    #[serde(default)]
    pub pid: u32,
}

impl ExporterConfig for ProcessExporterConfig {
    fn default_listen(&self) -> &'static str {
        ":17000"
    }

    fn default_namespace(&self) -> &'static str {
        "process_exporter"
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
        if self.process.pid == 0 {
            return Err(ExporterError::validation("process.pid must be > 0"));
        }
        Ok(())
    }
}
