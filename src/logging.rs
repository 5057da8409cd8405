// src/logging.rs

//! Log output for `dagremote`: `tracing` events rendered on stderr by a
//! `tracing-subscriber` fmt layer behind an `EnvFilter`.
//!
//! The filter comes from, in order:
//! 1. `--log-level`, applied to this crate only; dependencies stay at `warn`
//! 2. `DAGREMOTE_LOG`, read as full filter directives
//!    (e.g. `dagremote=debug,reqwest=info`)
//! 3. [`DEFAULT_DIRECTIVES`]

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "DAGREMOTE_LOG";

/// Our own events at `info`; HTTP client chatter only from `warn` up.
pub const DEFAULT_DIRECTIVES: &str = "warn,dagremote=info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let directives = filter_directives(cli_level, env.as_deref());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter '{directives}' (from {LOG_ENV} or --log-level)"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

/// Filter directives for the given CLI level and `DAGREMOTE_LOG` value.
pub fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return format!("warn,dagremote={}", level_directive(level));
    }

    match env.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => DEFAULT_DIRECTIVES.to_string(),
    }
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
