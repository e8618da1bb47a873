//! Configuration traits and utilities.

use std::net::SocketAddr;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use scrapewire_common::LoggingConfig;

use crate::args::ExporterArgs;
use crate::error::{ExporterError, Result};

/// Pull endpoint configuration shared by every exporter.
///
/// Empty `listen` and `namespace` are filled from the exporter's
/// [`ExporterConfig::default_listen`] and [`ExporterConfig::default_namespace`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, `host:port` or `:port`.
    #[serde(default)]
    pub listen: String,

    /// Path under which metrics are served.
    #[serde(default = "default_path")]
    pub path: String,

    /// Namespace prefix for exported metric names.
    #[serde(default)]
    pub namespace: String,
}

fn default_path() -> String {
    "/metrics".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: String::new(),
            path: default_path(),
            namespace: String::new(),
        }
    }
}

impl ServerConfig {
    /// Fill empty fields with exporter defaults.
    pub fn fill_defaults(&mut self, listen: &str, namespace: &str) {
        if self.listen.is_empty() {
            self.listen = listen.to_string();
        }
        if self.namespace.is_empty() {
            self.namespace = namespace.to_string();
        }
    }

    /// Apply CLI overrides.
    pub fn apply_args(&mut self, args: &ExporterArgs) {
        if let Some(ref listen) = args.listen {
            self.listen = listen.clone();
        }
        if let Some(ref endpoint) = args.endpoint {
            self.path = endpoint.clone();
        }
        if let Some(ref namespace) = args.namespace {
            self.namespace = namespace.clone();
        }
    }

    /// Parse the listen address. A bare `:port` binds all interfaces.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen(&self.listen)
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if !self.path.starts_with('/') {
            return Err(ExporterError::validation(format!(
                "metrics path must start with '/': {}",
                self.path
            )));
        }
        if self.path == "/health" {
            return Err(ExporterError::validation(
                "metrics path conflicts with /health",
            ));
        }
        if !self.namespace.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(ExporterError::validation(format!(
                "invalid metrics namespace: {:?}",
                self.namespace
            )));
        }

        Ok(())
    }
}

fn parse_listen(listen: &str) -> Result<SocketAddr> {
    let addr = if listen.starts_with(':') {
        format!("0.0.0.0{}", listen)
    } else {
        listen.to_string()
    };

    addr.parse()
        .map_err(|e| ExporterError::validation(format!("invalid listen address {:?}: {}", listen, e)))
}

/// Trait for exporter configuration types.
///
/// Implement this for an exporter's configuration struct to get JSON5
/// loading, default filling, CLI overrides and validation.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Default, Deserialize)]
/// pub struct EosConfig {
///     #[serde(default)]
///     pub server: ServerConfig,
///     #[serde(default)]
///     pub logging: LoggingConfig,
///     #[serde(default)]
///     pub probe: ProbeConfig,
/// }
///
/// impl ExporterConfig for EosConfig {
///     fn default_listen(&self) -> &'static str { ":18000" }
///     fn default_namespace(&self) -> &'static str { "eos" }
///
///     fn server(&self) -> &ServerConfig { &self.server }
///     fn server_mut(&mut self) -> &mut ServerConfig { &mut self.server }
///     fn logging(&self) -> &LoggingConfig { &self.logging }
/// }
/// ```
pub trait ExporterConfig: Sized + Default + DeserializeOwned {
    /// Listen address used when none is configured.
    fn default_listen(&self) -> &'static str;

    /// Metric namespace used when none is configured.
    fn default_namespace(&self) -> &'static str;

    fn server(&self) -> &ServerConfig;

    fn server_mut(&mut self) -> &mut ServerConfig;

    fn logging(&self) -> &LoggingConfig;

    /// Validate the configuration.
    ///
    /// Override to add exporter checks; keep calling `self.server().validate()`.
    fn validate(&self) -> Result<()> {
        self.server().validate()
    }

    /// Fill unset server fields from the exporter defaults.
    fn fill_defaults(&mut self) {
        let (listen, namespace) = (self.default_listen(), self.default_namespace());
        self.server_mut().fill_defaults(listen, namespace);
    }

    /// Parse a JSON5 document. Validation is left to the caller.
    fn parse(content: &str) -> Result<Self> {
        let mut config: Self = json5::from_str(content)?;
        config.fill_defaults();
        Ok(config)
    }

    /// Build the effective configuration from CLI arguments.
    ///
    /// Loads `--config` when given (defaults otherwise), applies the common
    /// overrides, then `apply` for exporter-specific flags, fills what is
    /// still unset and validates the result.
    fn resolve_with<F>(args: &ExporterArgs, apply: F) -> Result<Self>
    where
        F: FnOnce(&mut Self),
    {
        let mut config = match args.config {
            Some(ref path) => read_document(path)?,
            None => Self::default(),
        };

        config.server_mut().apply_args(args);
        apply(&mut config);
        config.fill_defaults();
        config.validate()?;

        Ok(config)
    }
}

/// Read a JSON5 configuration file without filling defaults.
fn read_document<C: DeserializeOwned>(path: &Path) -> Result<C> {
    if !path.exists() {
        return Err(ExporterError::ConfigNotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    Ok(json5::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug, Default, Deserialize)]
    struct TestConfig {
        #[serde(default)]
        server: ServerConfig,
        #[serde(default)]
        logging: LoggingConfig,
        #[serde(default)]
        pid: u32,
    }

    impl ExporterConfig for TestConfig {
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

        fn validate(&self) -> Result<()> {
            self.server().validate()?;
            if self.pid == 0 {
                return Err(ExporterError::validation("pid must be set"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_config_not_found() {
        let args = ExporterArgs {
            config: Some("/nonexistent/path.json5".into()),
            ..Default::default()
        };
        let result = TestConfig::resolve_with(&args, |c| c.pid = 1);
        assert!(matches!(result, Err(ExporterError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_parse_fills_defaults() {
        let config = TestConfig::parse("{ pid: 42 }").unwrap();
        assert_eq!(config.server.listen, ":17000");
        assert_eq!(config.server.path, "/metrics");
        assert_eq!(config.server.namespace, "process_exporter");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_keeps_explicit_values() {
        let config = TestConfig::parse(
            r#"{
                server: { listen: "127.0.0.1:9100", path: "/probe", namespace: "proc" },
                logging: { level: "debug" },
                pid: 1,
            }"#,
        )
        .unwrap();

        assert_eq!(config.server.listen, "127.0.0.1:9100");
        assert_eq!(config.server.path, "/probe");
        assert_eq!(config.server.namespace, "proc");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_parse_error() {
        let result = TestConfig::parse("{ pid: ");
        assert!(matches!(result, Err(ExporterError::ConfigParse(_))));
    }

    #[test]
    fn test_listen_addr_go_style() {
        let server = ServerConfig {
            listen: ":18000".to_string(),
            ..Default::default()
        };
        assert_eq!(server.listen_addr().unwrap(), "0.0.0.0:18000".parse().unwrap());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut server = ServerConfig {
            listen: "not-an-address".to_string(),
            path: "/metrics".to_string(),
            namespace: "ns".to_string(),
        };
        assert!(server.validate().is_err());

        server.listen = "127.0.0.1:0".to_string();
        assert!(server.validate().is_ok());

        server.path = "metrics".to_string();
        assert!(server.validate().is_err());

        server.path = "/health".to_string();
        assert!(server.validate().is_err());

        server.path = "/metrics".to_string();
        server.namespace = "__".to_string();
        assert!(server.validate().is_err());
    }

    #[test]
    fn test_resolve_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ server: {{ namespace: \"from_file\" }}, pid: 7 }}").unwrap();

        let args = ExporterArgs {
            config: Some(file.path().to_path_buf()),
            listen: Some("127.0.0.1:9999".to_string()),
            ..Default::default()
        };
        let config = TestConfig::resolve_with(&args, |c| c.pid = 9).unwrap();

        assert_eq!(config.server.listen, "127.0.0.1:9999");
        assert_eq!(config.server.namespace, "from_file");
        assert_eq!(config.pid, 9);
    }

    #[test]
    fn test_resolve_without_file_validates() {
        let args = ExporterArgs::default();
        let result = TestConfig::resolve_with(&args, |_| {});
        assert!(matches!(result, Err(ExporterError::ConfigValidation(_))));

        let config = TestConfig::resolve_with(&args, |c| c.pid = 1).unwrap();
        assert_eq!(config.server.listen, ":17000");
    }
}
