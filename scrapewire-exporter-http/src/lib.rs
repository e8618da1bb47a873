//! Prometheus exporter for HTTP status pages.
//!
//! Fetches a service status page on every pull and republishes the fields of
//! the selected [`Profile`] as metrics. Pages behind X.509 authentication are
//! fetched with a client identity supplied by [`CredentialProvider`].

pub mod config;
pub mod credentials;
pub mod profiles;
pub mod source;

pub use config::{CredentialsConfig, HttpExporterConfig, HttpSourceConfig};
pub use credentials::{CredentialFiles, CredentialProvider};
pub use profiles::Profile;
pub use source::HttpSource;
