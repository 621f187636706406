//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};

/// GeoTrack - Location report ingestion and query service
#[derive(Parser, Debug)]
#[command(
    name = "geotrack",
    author,
    version,
    about = "Location report ingestion and query service",
    long_about = "Receives device location reports over UDP, persists them into \n\
                  PostgreSQL through a bounded connection pool, and serves the \n\
                  latest and recent reports over an HTTP API."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GEOTRACK_VERBOSE")]
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
        env = "GEOTRACK_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ingestion and query service
    Run(RunArgs),

    /// Validate environment configuration without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Override the UDP ingestion port from the environment
    #[arg(long)]
    pub udp_port: Option<u16>,

    /// Override the HTTP query-API port from the environment
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "GEOTRACK_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Output validation result as JSON
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
