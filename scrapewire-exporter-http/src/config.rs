//! Configuration for the HTTP status-page exporter.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use scrapewire_framework::{ExporterConfig, ExporterError, LoggingConfig, ServerConfig};

use crate::profiles::Profile;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpExporterConfig {
    /// Pull endpoint.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Monitored status page.
    #[serde(default)]
    pub http: HttpSourceConfig,

    /// X.509 client identity.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Where and how to fetch the status page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Status page URI. Empty means the profile default.
    #[serde(default)]
    pub uri: String,

    /// Field table to publish.
    #[serde(default)]
    pub profile: Profile,

    /// `Accept` header; also selects JSON decoding for the status profile.
    #[serde(default)]
    pub content_type: Option<String>,

    /// `User-Agent` header.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Connect and request timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Skip server certificate verification.
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

fn default_connection_timeout() -> u64 {
    3
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            profile: Profile::default(),
            content_type: None,
            user_agent: None,
            connection_timeout_secs: default_connection_timeout(),
            insecure_skip_verify: false,
        }
    }
}

/// Client certificate sources, see [`CredentialProvider`](crate::CredentialProvider).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Attach a client identity to every request.
    ///
    /// Unset means on whenever `renew_interval_secs > 0`, continuing
    /// without an identity when none is found. `true` makes a missing
    /// identity a scrape failure.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Proxy file holding certificate chain and key.
    #[serde(default)]
    pub proxy_file: Option<PathBuf>,

    /// Certificate file, used with `key_file`.
    #[serde(default)]
    pub cert_file: Option<PathBuf>,

    /// Private key file, used with `cert_file`.
    #[serde(default)]
    pub key_file: Option<PathBuf>,

    /// Reload the identity after this many seconds (0 = never).
    #[serde(default = "default_renew_interval")]
    pub renew_interval_secs: u64,
}

fn default_renew_interval() -> u64 {
    600
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            proxy_file: None,
            cert_file: None,
            key_file: None,
            renew_interval_secs: default_renew_interval(),
        }
    }
}

impl CredentialsConfig {
    /// Whether requests carry a client identity.
    pub fn is_active(&self) -> bool {
        self.enabled.unwrap_or(self.renew_interval_secs > 0)
    }

    /// Whether failing to load an identity fails the scrape.
    pub fn is_required(&self) -> bool {
        self.enabled == Some(true)
    }
}

impl ExporterConfig for HttpExporterConfig {
    fn default_listen(&self) -> &'static str {
        self.http.profile.default_listen()
    }

    fn default_namespace(&self) -> &'static str {
        self.http.profile.default_namespace()
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

    fn fill_defaults(&mut self) {
        let (listen, namespace) = (self.default_listen(), self.default_namespace());
        self.server.fill_defaults(listen, namespace);

        let profile = self.http.profile;
        if self.http.uri.is_empty()
            && let Some(uri) = profile.default_uri()
        {
            self.http.uri = uri.to_string();
        }
        if self.http.content_type.is_none() {
            self.http.content_type = profile.content_type().map(str::to_string);
        }
    }

    fn validate(&self) -> scrapewire_framework::Result<()> {
        self.server.validate()?;

        if self.http.uri.is_empty() {
            return Err(ExporterError::validation("http.uri is required"));
        }
        let url = reqwest::Url::parse(&self.http.uri)
            .map_err(|e| ExporterError::validation(format!("invalid http.uri: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ExporterError::validation(format!(
                "unsupported http.uri scheme: {}",
                url.scheme()
            )));
        }

        if self.http.connection_timeout_secs == 0 {
            return Err(ExporterError::validation(
                "http.connection_timeout_secs must be > 0",
            ));
        }

        let creds = &self.credentials;
        if creds.cert_file.is_some() != creds.key_file.is_some() {
            return Err(ExporterError::validation(
                "credentials.cert_file and credentials.key_file must be set together",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpExporterConfig::default();
        assert_eq!(config.http.profile, Profile::Status);
        assert_eq!(config.http.connection_timeout_secs, 3);
        assert_eq!(config.credentials.enabled, None);
        assert_eq!(config.credentials.renew_interval_secs, 600);
        assert!(config.credentials.is_active());
        assert!(!config.credentials.is_required());
    }

    #[test]
    fn test_parse_das2go_profile_defaults() {
        let config = HttpExporterConfig::parse(r#"{ http: { profile: "das2go" } }"#).unwrap();

        assert_eq!(config.server.listen, ":18217");
        assert_eq!(config.server.namespace, "das2go");
        assert_eq!(config.http.uri, "http://localhost:8217/das/status");
        assert_eq!(config.http.content_type.as_deref(), Some("application/json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = HttpExporterConfig::parse(
            r#"{
                server: { listen: "127.0.0.1:18000", namespace: "dbs" },
                http: {
                    uri: "https://cmsweb.example.org/dbs/status",
                    user_agent: "scrapewire",
                    connection_timeout_secs: 10,
                },
                credentials: {
                    enabled: true,
                    proxy_file: "/tmp/x509up_u1000",
                    renew_interval_secs: 0,
                },
            }"#,
        )
        .unwrap();

        assert_eq!(config.server.namespace, "dbs");
        assert_eq!(config.http.user_agent.as_deref(), Some("scrapewire"));
        assert_eq!(config.http.content_type, None);
        assert_eq!(config.credentials.renew_interval_secs, 0);
        assert!(config.credentials.is_active());
        assert!(config.credentials.is_required());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_status_profile_requires_uri() {
        let config = HttpExporterConfig::parse("{}").unwrap();
        assert_eq!(config.server.namespace, "http");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config =
            HttpExporterConfig::parse(r#"{ http: { uri: "ftp://example.org/status" } }"#).unwrap();
        assert!(config.validate().is_err());

        config.http.uri = "http://example.org/status".to_string();
        assert!(config.validate().is_ok());

        config.http.connection_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.http.connection_timeout_secs = 3;
        config.credentials.cert_file = Some(PathBuf::from("/etc/cert.pem"));
        assert!(config.validate().is_err());
    }
}
