// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `initdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "initdag",
    version,
    about = "Start units in dependency order and stop them in reverse.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the unit manifest (TOML).
    #[arg(long, value_name = "PATH", default_value = "Initdag.toml")]
    pub manifest: String,

    /// Start every unit, then tear down immediately instead of waiting for
    /// Ctrl-C.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `INITDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the manifest and print the start order without running
    /// anything.
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

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
