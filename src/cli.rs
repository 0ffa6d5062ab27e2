// src/cli.rs

//! CLI argument parsing for the benchmark binary using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::WorkloadKind;

/// Command-line arguments for `depqueue`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "depqueue",
    version,
    about = "Benchmark the dependency-aware task queue.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a benchmark config file (TOML).
    ///
    /// Without it, every workload kind runs with default parameters.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Run only this workload kind (ignored when `--config` is given).
    #[arg(long, value_enum, value_name = "KIND")]
    pub workload: Option<WorkloadKind>,

    /// Override `[suite].steps`.
    #[arg(long, value_name = "N")]
    pub steps: Option<usize>,

    /// Override `[suite].repetitions`.
    #[arg(long, value_name = "N")]
    pub repetitions: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEPQUEUE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the suite, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
