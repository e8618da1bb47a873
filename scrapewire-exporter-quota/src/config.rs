//! Configuration for the quota exporter.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use scrapewire_framework::{
    ExporterConfig, ExporterError, FieldSpec, LoggingConfig, ServerConfig,
};

use crate::table::{FIELDS, LEGACY_FIELDS};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaExporterConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub command: CommandConfig,
}

/// How the script output is decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// YAML, which also accepts JSON.
    #[default]
    Auto,
    Yaml,
    Json,
}

/// Keys the script prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QuotaSchema {
    /// `cpus_total`, `ram_total_gbytes`, ...
    #[default]
    Openstack,
    /// `total_cpus`, `total_ram`, ... as printed by the older JSON script.
    Legacy,
}

impl QuotaSchema {
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            QuotaSchema::Openstack => FIELDS,
            QuotaSchema::Legacy => LEGACY_FIELDS,
        }
    }
}

/// The external quota script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Script passed to the interpreter.
    #[serde(default = "default_script")]
    pub script: PathBuf,

    /// Environment file passed as the script's only argument.
    #[serde(default = "default_env_file")]
    pub env_file: Option<PathBuf>,

    #[serde(default = "default_interpreter")]
    pub interpreter: PathBuf,

    /// Kill the script after this many seconds (0 = no limit).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub schema: QuotaSchema,
}

fn default_script() -> PathBuf {
    PathBuf::from("quota.sh")
}

fn default_env_file() -> Option<PathBuf> {
    Some(PathBuf::from("/etc/secrets/env.sh"))
}

fn default_interpreter() -> PathBuf {
    PathBuf::from("/bin/bash")
}

fn default_timeout() -> u64 {
    120
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            script: default_script(),
            env_file: default_env_file(),
            interpreter: default_interpreter(),
            timeout_secs: default_timeout(),
            format: OutputFormat::default(),
            schema: QuotaSchema::default(),
        }
    }
}

impl ExporterConfig for QuotaExporterConfig {
    fn default_listen(&self) -> &'static str {
        ":18000"
    }

    fn default_namespace(&self) -> &'static str {
        "openstack"
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

        if self.command.script.as_os_str().is_empty() {
            return Err(ExporterError::validation("command.script is required"));
        }
        if self.command.interpreter.as_os_str().is_empty() {
            return Err(ExporterError::validation("command.interpreter is required"));
        }
        Ok(())
    }
}
