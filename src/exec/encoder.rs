// src/exec/encoder.rs

//! Turns a built job into the single shell string the remote service runs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::{DagremoteError, Result};
use crate::step::BuiltJob;

/// The command as shown to users and as actually executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCommand {
    /// What the user wrote (command, or raw script text).
    pub prettified: String,
    /// What the remote service executes.
    pub wrapped: String,
}

/// Encode a job's command.
///
/// - a literal command is used verbatim for both forms
/// - a script is base64-encoded and piped into its interpreter:
///   `echo <b64>|base64 -d|<interpreter>`
///
/// A job with neither (or a script without interpreter) is malformed.
pub fn encode_command(job: &BuiltJob) -> Result<EncodedCommand> {
    if let Some(command) = &job.command {
        return Ok(EncodedCommand {
            prettified: command.clone(),
            wrapped: command.clone(),
        });
    }

    if let Some(script) = &job.script {
        let interpreter = job
            .interpreter
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .ok_or_else(|| {
                DagremoteError::MalformedStep("script given without an interpreter".to_string())
            })?;

        return Ok(EncodedCommand {
            prettified: script.clone(),
            wrapped: wrap_script(script, interpreter),
        });
    }

    Err(DagremoteError::MalformedStep(
        "process has neither a command nor a script".to_string(),
    ))
}

fn wrap_script(script: &str, interpreter: &str) -> String {
    let encoded = STANDARD.encode(script.as_bytes());
    format!("echo {encoded}|base64 -d|{interpreter}")
}
