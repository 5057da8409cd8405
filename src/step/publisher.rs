// src/step/publisher.rs

//! Output publishers: how a finished step declares its outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{DagremoteError, Result};
use crate::step::state::StepState;
use crate::step::template::{interpolate, template_context};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "publisher_type")]
pub enum PublisherSpec {
    /// Each output is copied from the named input parameter.
    #[serde(rename = "frompar-pub")]
    FromParameters { outputmap: BTreeMap<String, String> },

    /// Each output is a template (or nested structure of templates).
    #[serde(rename = "interpolated-pub")]
    Interpolated { publish: BTreeMap<String, Value> },

    /// Outputs are given literally.
    #[serde(rename = "constant-pub")]
    Constant { publish: Value },
}

impl Default for PublisherSpec {
    fn default() -> Self {
        PublisherSpec::Constant {
            publish: Value::Object(Map::new()),
        }
    }
}

/// Run a publisher against a step's parameters and state.
pub fn publish(
    spec: &PublisherSpec,
    parameters: &Map<String, Value>,
    state: &StepState,
) -> Result<Value> {
    match spec {
        PublisherSpec::FromParameters { outputmap } => {
            let mut out = Map::new();
            for (output, parameter) in outputmap {
                let value = parameters.get(parameter).ok_or_else(|| {
                    DagremoteError::Template(format!(
                        "output '{output}' refers to unknown parameter '{parameter}'"
                    ))
                })?;
                out.insert(output.clone(), value.clone());
            }
            Ok(Value::Object(out))
        }
        PublisherSpec::Interpolated { publish } => {
            let context = template_context(parameters, state);
            let mut out = Map::new();
            for (output, template) in publish {
                out.insert(output.clone(), interpolate_value(template, &context)?);
            }
            Ok(Value::Object(out))
        }
        PublisherSpec::Constant { publish } => Ok(publish.clone()),
    }
}

fn interpolate_value(value: &Value, context: &Map<String, Value>) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(interpolate(s, context)?)),
        Value::Array(items) => items
            .iter()
            .map(|item| interpolate_value(item, context))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), interpolate_value(v, context)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}
