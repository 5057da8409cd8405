// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dagremote`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagremote",
    version,
    about = "Run a workflow DAG by submitting each step to a remote job controller.",
    long_about = None
)]
pub struct CliArgs {
    /// Identifier of the workflow being run; tags every status message.
    #[arg(long, value_name = "UUID")]
    pub workflow_uuid: String,

    /// Workspace name, relative to the configured shared volume path.
    #[arg(long, value_name = "NAME")]
    pub workflow_workspace: String,

    /// Base64-encoded JSON workflow document.
    #[arg(long, value_name = "BASE64")]
    pub workflow_json: Option<String>,

    /// Path to a JSON workflow document, relative to the workspace.
    ///
    /// Only used when `--workflow-json` is not given.
    #[arg(long, value_name = "PATH")]
    pub workflow_file: Option<String>,

    /// Base64-encoded JSON object of workflow input parameters.
    #[arg(long, value_name = "BASE64")]
    pub workflow_parameters: Option<String>,

    /// Path to the adapter config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "dagremote.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGREMOTE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate the workflow, print the DAG, but don't submit anything.
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
