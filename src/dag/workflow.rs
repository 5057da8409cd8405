// src/dag/workflow.rs

//! Workflow document: the stages of a DAG and their dependencies.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{DagremoteError, Result};
use crate::step::StepSpec;

/// Top-level workflow document.
///
/// ```json
/// {"stages": [
///   {"name": "fit", "dependencies": ["gendata"],
///    "parameters": {"data": "{workdir}/data.root"},
///    "step": {"process": {..}, "environment": {..}, "publisher": {..}}}
/// ]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub stages: Vec<StageSpec>,
}

/// One stage (DAG node) of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,

    /// Names of stages that must succeed before this one runs.
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub parameters: Map<String, Value>,

    pub step: StepSpec,

    /// Pure-publishing stages run no job; only their publisher is applied.
    #[serde(default)]
    pub pure_publishing: bool,
}

impl WorkflowSpec {
    /// Parse and validate a JSON workflow document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let spec: WorkflowSpec = serde_json::from_str(s)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse and validate a base64-encoded JSON workflow document.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD.decode(encoded.trim())?;
        let spec: WorkflowSpec = serde_json::from_slice(&bytes)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn stage(&self, name: &str) -> Option<&StageSpec> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_has_stages(self)?;
        validate_stage_names(self)?;
        validate_stage_dependencies(self)?;
        validate_dag(self)?;
        Ok(())
    }
}

/// Decode a base64-encoded JSON object (e.g. workflow input parameters).
pub fn decode_parameters(encoded: &str) -> Result<Map<String, Value>> {
    let bytes = STANDARD.decode(encoded.trim())?;
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(DagremoteError::Workflow(format!(
            "workflow parameters must be a JSON object (got {other})"
        ))),
    }
}

fn ensure_has_stages(spec: &WorkflowSpec) -> Result<()> {
    if spec.stages.is_empty() {
        return Err(DagremoteError::Workflow(
            "workflow must contain at least one stage".to_string(),
        ));
    }
    Ok(())
}

fn validate_stage_names(spec: &WorkflowSpec) -> Result<()> {
    let mut seen = HashSet::new();
    for stage in &spec.stages {
        if stage.name.trim().is_empty() {
            return Err(DagremoteError::Workflow(
                "stage names must not be empty".to_string(),
            ));
        }
        if stage.name == "." || stage.name == ".." || stage.name.contains(['/', '\\']) {
            return Err(DagremoteError::Workflow(format!(
                "stage name '{}' must not contain path separators or be '.' / '..'",
                stage.name
            )));
        }
        if !seen.insert(stage.name.as_str()) {
            return Err(DagremoteError::Workflow(format!(
                "duplicate stage name '{}'",
                stage.name
            )));
        }
    }
    Ok(())
}

fn validate_stage_dependencies(spec: &WorkflowSpec) -> Result<()> {
    for stage in &spec.stages {
        for dep in &stage.dependencies {
            if spec.stage(dep).is_none() {
                return Err(DagremoteError::Workflow(format!(
                    "stage '{}' has unknown dependency '{}'",
                    stage.name, dep
                )));
            }
            if dep == &stage.name {
                return Err(DagremoteError::Workflow(format!(
                    "stage '{}' cannot depend on itself",
                    stage.name
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(spec: &WorkflowSpec) -> Result<()> {
    topological_stage_order(spec).map(|_| ())
}

/// Stage names in topological order.
///
/// Edge direction: dependency -> stage.
pub(crate) fn topological_stage_order(spec: &WorkflowSpec) -> Result<Vec<String>> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for stage in &spec.stages {
        graph.add_node(stage.name.as_str());
    }

    for stage in &spec.stages {
        for dep in &stage.dependencies {
            graph.add_edge(dep.as_str(), stage.name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => Err(DagremoteError::DagCycle(format!(
            "cycle detected in workflow involving stage '{}'",
            cycle.node_id()
        ))),
    }
}
