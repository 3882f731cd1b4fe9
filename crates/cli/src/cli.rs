//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Olivine - batching telemetry relay agent
#[derive(Parser, Debug)]
#[command(
    name = "olivine",
    author,
    version,
    about = "Batching telemetry relay agent",
    long_about = "A long-running telemetry agent.\n\n\
                  Polls configured sources on independent schedules, routes every \n\
                  measurement to every configured handler, and flushes buffered \n\
                  batches to the handlers' sinks on size or time triggers."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "OLIVINE_VERBOSE")]
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
        env = "OLIVINE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the agent
    Run(RunArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to the agent configuration file (JSON)
    #[arg(short, long, default_value = "olivine.conf", env = "OLIVINE_CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to the agent configuration file (JSON)
    #[arg(short, long, default_value = "olivine.conf", env = "OLIVINE_CONFIG")]
    pub config: PathBuf,

    /// Print the validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LogFormat {
    /// JSON structured logs
    Json,
    /// Human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
}
