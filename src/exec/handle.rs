// src/exec/handle.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::errors::{DagremoteError, Result};
use crate::step::{StepSpec, StepState};

/// A submitted remote job, as handed back to the engine.
///
/// Carries everything needed to publish the step's outputs once the job is
/// done: the step, its contextualised parameters and the step state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: String,
    pub spec: StepSpec,
    pub pars: Map<String, Value>,
    pub state: StepState,
}

impl JobHandle {
    pub fn proxyname(&self) -> &'static str {
        "ExternalProxy"
    }

    /// Serialisable details, as stored by the engine alongside the node.
    pub fn details(&self) -> Value {
        json!({
            "job_id": self.job_id,
            "spec": self.spec,
            "pars": self.pars,
            "state": self.state.json(),
        })
    }

    /// Full serialised form: `{"proxyname": .., "proxydetails": ..}`.
    pub fn json(&self) -> Value {
        json!({
            "proxyname": self.proxyname(),
            "proxydetails": self.details(),
        })
    }

    /// Restore a handle from the form produced by [`JobHandle::json`].
    pub fn from_json(data: &Value) -> Result<Self> {
        let details = data.get("proxydetails").ok_or_else(|| {
            DagremoteError::Workflow("job handle JSON has no 'proxydetails'".to_string())
        })?;
        Ok(serde_json::from_value(details.clone())?)
    }
}
