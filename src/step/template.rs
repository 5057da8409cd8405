// src/step/template.rs

//! `{name}` interpolation of command and script templates.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::errors::{DagremoteError, Result};
use crate::step::model::ProcessSpec;
use crate::step::state::StepState;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
});

/// A step's process descriptor after parameter interpolation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltJob {
    pub command: Option<String>,
    pub script: Option<String>,
    pub interpreter: Option<String>,
}

/// Interpolate the process templates with the (contextualised) parameters.
///
/// `{workdir}` is always available and resolves to the step's work
/// directory unless a parameter of that name overrides it.
pub fn build_job(
    process: &ProcessSpec,
    parameters: &Map<String, Value>,
    state: &StepState,
) -> Result<BuiltJob> {
    let context = template_context(parameters, state);

    let command = process
        .command
        .as_deref()
        .map(|t| interpolate(t, &context))
        .transpose()?;
    let script = process
        .script
        .as_deref()
        .map(|t| interpolate(t, &context))
        .transpose()?;

    Ok(BuiltJob {
        command,
        script,
        interpreter: process.interpreter.clone(),
    })
}

pub(crate) fn template_context(parameters: &Map<String, Value>, state: &StepState) -> Map<String, Value> {
    let mut context = parameters.clone();
    if let Some(workdir) = state.workdir() {
        context
            .entry("workdir")
            .or_insert_with(|| Value::String(workdir.to_string_lossy().into_owned()));
    }
    context
}

/// Replace `{name}` placeholders in `template` with values from `context`.
///
/// - strings are inserted verbatim, arrays are joined with single spaces,
///   anything else is inserted as JSON text
/// - `{{` and `}}` produce literal braces
/// - `${name}` is left untouched so shell variable expansion survives
/// - any other unknown placeholder is an error
pub fn interpolate(template: &str, context: &Map<String, Value>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let whole = caps.get(0).expect("group 0 always matches");
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        match whole.as_str() {
            "{{" => out.push('{'),
            "}}" => out.push('}'),
            _ => out.push_str(&substitute(template, &caps, context)?),
        }
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn substitute(template: &str, caps: &Captures<'_>, context: &Map<String, Value>) -> Result<String> {
    let whole = caps.get(0).expect("group 0 always matches");
    let name = &caps[1];

    if let Some(value) = context.get(name) {
        return Ok(render_value(value));
    }

    if template[..whole.start()].ends_with('$') {
        return Ok(whole.as_str().to_string());
    }

    Err(DagremoteError::Template(format!(
        "unknown parameter '{name}' in template"
    )))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}
