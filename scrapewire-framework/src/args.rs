//! CLI argument parsing shared by exporters.

use std::path::PathBuf;

use clap::Args;

/// Common CLI arguments for all exporters.
///
/// Flatten into an exporter's own `Parser`:
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     common: ExporterArgs,
///
///     /// Process id to monitor.
///     #[arg(long)]
///     pid: Option<u32>,
/// }
/// ```
#[derive(Args, Debug, Clone, Default)]
pub struct ExporterArgs {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// HTTP listen address, e.g. "0.0.0.0:18000" or ":18000" (overrides config).
    #[arg(long)]
    pub listen: Option<String>,

    /// Path under which to expose metrics (overrides config).
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Namespace prefix for exported metric names (overrides config).
    #[arg(long)]
    pub namespace: Option<String>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Verbose output, same as `--log-level debug`.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        common: ExporterArgs,
    }

    #[test]
    fn test_args_flatten() {
        let cli = Cli::parse_from([
            "exporter",
            "--config",
            "das2go.json5",
            "--listen",
            ":18217",
            "--namespace",
            "das2go",
            "-v",
        ]);

        assert_eq!(cli.common.config, Some(PathBuf::from("das2go.json5")));
        assert_eq!(cli.common.listen.as_deref(), Some(":18217"));
        assert_eq!(cli.common.namespace.as_deref(), Some("das2go"));
        assert_eq!(cli.common.endpoint, None);
        assert!(cli.common.verbose);
    }

    #[test]
    fn test_args_defaults() {
        let cli = Cli::parse_from(["exporter"]);
        assert!(cli.common.config.is_none());
        assert!(cli.common.log_level.is_none());
        assert!(!cli.common.verbose);
    }
}
