//! Prometheus exporter for EOS mount accessibility.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use scrapewire_framework::{ExporterArgs, ExporterConfig, ExporterRunner};

use scrapewire_exporter_eos::{EosExporterConfig, FIELDS, PathProbeSource};

#[derive(Parser, Debug)]
#[command(name = "scrapewire-exporter-eos", version, about)]
struct Cli {
    #[command(flatten)]
    common: ExporterArgs,

    /// EOS directory to probe.
    #[arg(long = "eos-path")]
    eos_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = EosExporterConfig::resolve_with(&cli.common, |config| {
        if let Some(ref path) = cli.eos_path {
            config.probe.path = path.clone();
        }
    })?;

    let runner = ExporterRunner::new("scrapewire-exporter-eos", &config, &cli.common)?;

    runner.run(PathProbeSource::new(&config.probe.path), FIELDS).await?;

    Ok(())
}
