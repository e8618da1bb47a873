//! Prometheus exporter for OpenStack project quotas.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use scrapewire_framework::{ExporterArgs, ExporterConfig, ExporterRunner};

use scrapewire_exporter_quota::{CommandSource, OutputFormat, QuotaExporterConfig, QuotaSchema};

#[derive(Parser, Debug)]
#[command(name = "scrapewire-exporter-quota", version, about)]
struct Cli {
    #[command(flatten)]
    common: ExporterArgs,

    /// Quota script to run.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Environment file passed to the script.
    #[arg(long = "env")]
    env_file: Option<PathBuf>,

    /// Interpreter the script is run with.
    #[arg(long)]
    interpreter: Option<PathBuf>,

    /// Script timeout in seconds (0 = no limit).
    #[arg(long)]
    timeout: Option<u64>,

    /// Output format of the script.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Keys the script prints.
    #[arg(long, value_enum)]
    schema: Option<QuotaSchema>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = QuotaExporterConfig::resolve_with(&cli.common, |config| {
        let command = &mut config.command;
        if let Some(ref script) = cli.script {
            command.script = script.clone();
        }
        if let Some(ref env_file) = cli.env_file {
            command.env_file = Some(env_file.clone());
        }
        if let Some(ref interpreter) = cli.interpreter {
            command.interpreter = interpreter.clone();
        }
        if let Some(timeout) = cli.timeout {
            command.timeout_secs = timeout;
        }
        if let Some(format) = cli.format {
            command.format = format;
        }
        if let Some(schema) = cli.schema {
            command.schema = schema;
        }
    })?;

    let runner = ExporterRunner::new("scrapewire-exporter-quota", &config, &cli.common)?;

    let fields = config.command.schema.fields();
    runner.run(CommandSource::new(&config.command), fields).await?;

    Ok(())
}
