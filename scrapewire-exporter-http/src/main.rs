//! Prometheus exporter for HTTP status pages.
//!
//! Scrapes a status page (das2go, WMCore, ReqMgr2, CherryPy or a plain
//! availability check) on every pull and serves the result as metrics.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use scrapewire_framework::{ExporterArgs, ExporterConfig, ExporterRunner};

use scrapewire_exporter_http::{HttpExporterConfig, HttpSource, Profile};

#[derive(Parser, Debug)]
#[command(name = "scrapewire-exporter-http", version, about)]
struct Cli {
    #[command(flatten)]
    common: ExporterArgs,

    /// Status page URI.
    #[arg(long)]
    uri: Option<String>,

    /// Field table to publish.
    #[arg(long, value_enum)]
    profile: Option<Profile>,

    /// Accept header, e.g. application/json.
    #[arg(long)]
    content_type: Option<String>,

    /// User-Agent header.
    #[arg(long)]
    agent: Option<String>,

    /// Connection timeout in seconds.
    #[arg(long)]
    connection_timeout: Option<u64>,

    /// X.509 proxy file, used instead of /tmp/x509up_u<uid>.
    #[arg(long)]
    proxyfile: Option<PathBuf>,

    /// Reload the client identity after this many seconds; 0 disables
    /// client authentication.
    #[arg(long)]
    renew_interval: Option<u64>,

    /// Never attach a client identity.
    #[arg(long)]
    no_credentials: bool,
}

impl Cli {
    fn apply(self, config: &mut HttpExporterConfig) {
        if let Some(uri) = self.uri {
            config.http.uri = uri;
        }
        if let Some(profile) = self.profile {
            config.http.profile = profile;
        }
        if let Some(content_type) = self.content_type {
            config.http.content_type = Some(content_type);
        }
        if let Some(agent) = self.agent {
            config.http.user_agent = Some(agent);
        }
        if let Some(timeout) = self.connection_timeout {
            config.http.connection_timeout_secs = timeout;
        }
        if let Some(proxy) = self.proxyfile {
            config.credentials.proxy_file = Some(proxy);
        }
        if let Some(renew) = self.renew_interval {
            config.credentials.renew_interval_secs = renew;
        }
        if self.no_credentials {
            config.credentials.enabled = Some(false);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let common = cli.common.clone();

    let config = HttpExporterConfig::resolve_with(&common, |config| cli.apply(config))?;

    let runner = ExporterRunner::new("scrapewire-exporter-http", &config, &common)?;

    tracing::info!(
        uri = %config.http.uri,
        profile = ?config.http.profile,
        credentials = config.credentials.is_active(),
        "HTTP exporter configured"
    );

    let source = HttpSource::new(&config);
    runner.run(source, config.http.profile.fields()).await?;

    Ok(())
}
