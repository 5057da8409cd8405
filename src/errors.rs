// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::exec::client::RemoteError;

#[derive(Error, Debug)]
pub enum DagremoteError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A step whose process descriptor cannot be turned into a command.
    #[error("Malformed step: {0}")]
    MalformedStep(String),

    #[error("remote call failed ({context}): {source}")]
    RemoteCall {
        context: String,
        #[source]
        source: RemoteError,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("base64 decoding error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DagremoteError {
    pub fn remote(context: impl Into<String>, source: RemoteError) -> Self {
        DagremoteError::RemoteCall {
            context: context.into(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagremoteError>;
