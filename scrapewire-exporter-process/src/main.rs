//! Prometheus exporter for process resource usage.

use anyhow::Result;
use clap::Parser;
use scrapewire_framework::{ExporterArgs, ExporterConfig, ExporterRunner};

use scrapewire_exporter_process::{FIELDS, ProcessExporterConfig, ProcessSource};

#[derive(Parser, Debug)]
#[command(name = "scrapewire-exporter-process", version, about)]
struct Cli {
    #[command(flatten)]
    common: ExporterArgs,

    /// Process id to monitor.
    #[arg(long)]
    pid: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ProcessExporterConfig::resolve_with(&cli.common, |config| {
        if let Some(pid) = cli.pid {
            config.process.pid = pid;
        }
    })?;

    let runner = ExporterRunner::new("scrapewire-exporter-process", &config, &cli.common)?;

    runner.run(ProcessSource::new(config.process.pid), FIELDS).await?;

    Ok(())
}
