// src/step/state.rs

//! Per-step workspace state and parameter contextualisation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::Result;

/// Placeholder in parameter values that is rewritten to the step's work
/// directory.
pub const WORKDIR_PLACEHOLDER: &str = "{workdir}";

/// Directories a step reads from and writes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    pub readwrite: Vec<PathBuf>,

    #[serde(default)]
    pub readonly: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl StepState {
    /// State for step `name` inside `workspace`: a single readwrite directory
    /// `<workspace>/<name>`.
    pub fn for_step(workspace: &Path, name: &str) -> Self {
        Self {
            readwrite: vec![workspace.join(name)],
            readonly: Vec::new(),
            identifier: Some(name.to_string()),
        }
    }

    /// The step's primary work directory.
    pub fn workdir(&self) -> Option<&Path> {
        self.readwrite.first().map(PathBuf::as_path)
    }

    /// Create the readwrite directories if they do not exist yet.
    pub fn ensure(&self) -> Result<()> {
        for dir in &self.readwrite {
            if !dir.exists() {
                debug!(dir = %dir.display(), "creating step directory");
                fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }

    pub fn json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Resolve parameter values against a step's state.
///
/// Every string (at any depth) containing `{workdir}` gets the step's work
/// directory substituted in. Parameters are otherwise returned unchanged.
pub fn contextualize_parameters(parameters: &Map<String, Value>, state: &StepState) -> Map<String, Value> {
    let Some(workdir) = state.workdir() else {
        return parameters.clone();
    };
    let workdir = workdir.to_string_lossy();

    parameters
        .iter()
        .map(|(k, v)| (k.clone(), contextualize_value(v, &workdir)))
        .collect()
}

fn contextualize_value(value: &Value, workdir: &str) -> Value {
    match value {
        Value::String(s) if s.contains(WORKDIR_PLACEHOLDER) => {
            Value::String(s.replace(WORKDIR_PLACEHOLDER, workdir))
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| contextualize_value(item, workdir))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), contextualize_value(v, workdir)))
                .collect(),
        ),
        other => other.clone(),
    }
}
