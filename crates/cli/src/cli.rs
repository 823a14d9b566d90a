//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Telemetry Poller - sensor ingestion with watermark-based incremental polling
#[derive(Parser, Debug)]
#[command(
    name = "telemetry-poller",
    author,
    version,
    about = "Telemetry ingestion station with watermark polling",
    long_about = "Reads raw telemetry lines from a serial device, a replay file or a \n\
                  synthetic generator, buffers them, and polls the buffer on a fixed \n\
                  interval, delivering only records newer than the last watermark."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TELEMETRY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TELEMETRY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the writer and the polling loop until stopped
    Run(RunArgs),

    /// Poll the configured buffer once and print the batch as JSON
    Poll(PollArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "station.toml",
        env = "TELEMETRY_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the polling interval from configuration (milliseconds)
    #[arg(long, env = "TELEMETRY_INTERVAL_MS")]
    pub interval_ms: Option<u64>,

    /// Override the watermark checkpoint file from configuration
    #[arg(long, env = "TELEMETRY_CHECKPOINT")]
    pub checkpoint: Option<PathBuf>,

    /// Stop after this many poll attempts (0 = unlimited)
    #[arg(long, default_value = "0", env = "TELEMETRY_MAX_POLLS")]
    pub max_polls: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "TELEMETRY_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "TELEMETRY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `poll` command
#[derive(Parser, Debug)]
pub struct PollArgs {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "station.toml",
        env = "TELEMETRY_CONFIG"
    )]
    pub config: PathBuf,

    /// Last delivered watermark (empty = deliver everything)
    #[arg(short, long, default_value = "")]
    pub watermark: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "station.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "station.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "telemetry-poller",
            "-v",
            "run",
            "--config",
            "station.toml",
            "--interval-ms",
            "250",
            "--max-polls",
            "3",
            "--metrics-port",
            "0",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.interval_ms, Some(250));
        assert_eq!(args.max_polls, 3);
        assert_eq!(args.metrics_port, 0);
    }

    #[test]
    fn test_parse_poll_watermark() {
        let cli =
            Cli::try_parse_from(["telemetry-poller", "poll", "--watermark", "9:41:12"]).unwrap();
        let Commands::Poll(args) = cli.command else {
            panic!("expected poll command");
        };
        assert_eq!(args.watermark, "9:41:12");
        assert!(!args.pretty);
    }
}
