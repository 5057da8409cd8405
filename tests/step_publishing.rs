// tests/step_publishing.rs

use std::path::Path;

use serde_json::{Map, Value, json};

use dagremote::errors::DagremoteError;
use dagremote::step::{
    ProcessSpec, PublisherSpec, StepState, build_job, contextualize_parameters, interpolate,
    publish,
};

fn params(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn state() -> StepState {
    StepState::for_step(Path::new("/work/wf"), "fit")
}

#[test]
fn interpolation_renders_strings_arrays_and_numbers() {
    let ctx = params(&[
        ("file", json!("a.root")),
        ("files", json!(["a.root", "b.root"])),
        ("n", json!(3)),
    ]);

    assert_eq!(
        interpolate("hadd out.root {files} && head -n {n} {file}", &ctx).unwrap(),
        "hadd out.root a.root b.root && head -n 3 a.root"
    );
}

#[test]
fn shell_variables_and_escaped_braces_survive() {
    let ctx = params(&[]);

    assert_eq!(
        interpolate("echo ${HOME} {{literal}}", &ctx).unwrap(),
        "echo ${HOME} {literal}"
    );
}

#[test]
fn unknown_placeholder_is_a_template_error() {
    let result = interpolate("echo {missing}", &params(&[]));

    assert!(matches!(result, Err(DagremoteError::Template(_))));
}

#[test]
fn workdir_is_resolved_in_nested_parameters() {
    let parameters = params(&[
        ("out", json!("{workdir}/out.root")),
        ("nested", json!({"list": ["{workdir}/a", 1]})),
        ("plain", json!("untouched")),
    ]);

    let resolved = contextualize_parameters(&parameters, &state());

    assert_eq!(resolved["out"], json!("/work/wf/fit/out.root"));
    assert_eq!(resolved["nested"], json!({"list": ["/work/wf/fit/a", 1]}));
    assert_eq!(resolved["plain"], json!("untouched"));
}

#[test]
fn build_job_exposes_workdir_to_templates() {
    let process = ProcessSpec::script("cd {workdir} && run {input}", "bash");
    let job = build_job(&process, &params(&[("input", json!("x.txt"))]), &state()).unwrap();

    assert_eq!(job.script.as_deref(), Some("cd /work/wf/fit && run x.txt"));
    assert_eq!(job.interpreter.as_deref(), Some("bash"));
    assert_eq!(job.command, None);
}

#[test]
fn frompar_publisher_copies_parameters() {
    let spec = PublisherSpec::FromParameters {
        outputmap: [("result".to_string(), "out".to_string())]
            .into_iter()
            .collect(),
    };

    let outputs = publish(&spec, &params(&[("out", json!("r.json"))]), &state()).unwrap();
    assert_eq!(outputs, json!({"result": "r.json"}));

    let missing = publish(&spec, &params(&[]), &state());
    assert!(matches!(missing, Err(DagremoteError::Template(_))));
}

#[test]
fn interpolated_publisher_renders_nested_templates() {
    let spec = PublisherSpec::Interpolated {
        publish: [(
            "files".to_string(),
            json!(["{workdir}/{name}.json", {"log": "{workdir}/log.txt"}]),
        )]
        .into_iter()
        .collect(),
    };

    let outputs = publish(&spec, &params(&[("name", json!("fit"))]), &state()).unwrap();

    assert_eq!(
        outputs,
        json!({"files": ["/work/wf/fit/fit.json", {"log": "/work/wf/fit/log.txt"}]})
    );
}

#[test]
fn constant_publisher_is_returned_as_is() {
    let spec: PublisherSpec =
        serde_json::from_value(json!({"publisher_type": "constant-pub", "publish": {"k": [1, 2]}}))
            .unwrap();

    assert_eq!(
        publish(&spec, &params(&[]), &state()).unwrap(),
        json!({"k": [1, 2]})
    );
}
