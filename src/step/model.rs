// src/step/model.rs

//! Step model: what one DAG node asks the remote service to do.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::step::publisher::PublisherSpec;

/// Immutable description of one step's work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub process: ProcessSpec,
    pub environment: EnvironmentSpec,
    pub publisher: PublisherSpec,
}

/// How to run the step.
///
/// Accepts both the tagged form (`process_type` =
/// `string-interpolated-cmd` / `interpreted-script`) and a bare
/// `{command}` or `{script, interpreter}` object. Whether the descriptor is
/// usable is only decided when the command is encoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_type: Option<String>,

    /// Command template; `cmd` is accepted as an alias.
    #[serde(default, alias = "cmd", skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Script body template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    /// Interpreter the script is piped into (e.g. `bash`, `python`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
}

impl ProcessSpec {
    pub fn command(cmd: impl Into<String>) -> Self {
        Self {
            process_type: Some("string-interpolated-cmd".to_string()),
            command: Some(cmd.into()),
            ..Self::default()
        }
    }

    pub fn script(script: impl Into<String>, interpreter: impl Into<String>) -> Self {
        Self {
            process_type: Some("interpreted-script".to_string()),
            script: Some(script.into()),
            interpreter: Some(interpreter.into()),
            ..Self::default()
        }
    }
}

/// Where to run the step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_type: Option<String>,

    /// Container image, without tag.
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagetag: Option<String>,

    /// Loosely-typed resource hints; merged by `exec::resources`.
    #[serde(default)]
    pub resources: Vec<Value>,
}

impl EnvironmentSpec {
    /// Fully-qualified image reference: `image:tag` when a tag is set.
    pub fn image_reference(&self) -> String {
        match self.imagetag.as_deref() {
            Some(tag) if !tag.is_empty() => format!("{}:{}", self.image, tag),
            _ => self.image.clone(),
        }
    }
}

/// Per-submission metadata supplied by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetadata {
    /// Human-readable step name; becomes the remote job name.
    pub name: String,
}
