// tests/workflow_document.rs

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use tempfile::NamedTempFile;

use dagremote::dag::{DagView, StepGraph, WorkflowSpec, decode_parameters};
use dagremote::errors::DagremoteError;
use dagremote::step::PublisherSpec;
use dagremote_test_utils::builders::WorkflowSpecBuilder;

fn document() -> serde_json::Value {
    json!({
        "stages": [
            {
                "name": "gen",
                "parameters": {"events": 100},
                "step": {
                    "process": {"process_type": "interpreted-script", "script": "echo gen", "interpreter": "sh"},
                    "environment": {"image": "busybox", "imagetag": "1.36"},
                    "publisher": {"publisher_type": "frompar-pub", "outputmap": {"n": "events"}}
                }
            },
            {
                "name": "fit",
                "dependencies": ["gen"],
                "step": {
                    "process": {"cmd": "fit"},
                    "environment": {"image": "root", "resources": [{"kerberos": true}]},
                    "publisher": {"publisher_type": "constant-pub", "publish": {}}
                }
            }
        ]
    })
}

#[test]
fn base64_document_is_decoded_and_validated() {
    let encoded = STANDARD.encode(document().to_string());

    let spec = WorkflowSpec::from_base64(&encoded).unwrap();

    assert_eq!(spec.stages.len(), 2);
    let gen_stage = spec.stage("gen").unwrap();
    assert_eq!(gen_stage.step.environment.image_reference(), "busybox:1.36");
    assert!(matches!(
        gen_stage.step.publisher,
        PublisherSpec::FromParameters { .. }
    ));
    let fit = spec.stage("fit").unwrap();
    assert_eq!(fit.step.process.command.as_deref(), Some("fit"));
    assert_eq!(fit.dependencies, vec!["gen".to_string()]);
}

#[test]
fn document_is_read_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", document()).unwrap();

    let spec = WorkflowSpec::from_path(file.path()).unwrap();

    assert!(spec.stage("fit").is_some());
}

#[test]
fn cycle_is_rejected() {
    let spec = WorkflowSpecBuilder::new()
        .command_stage("a", "echo a", &["b"])
        .command_stage("b", "echo b", &["a"])
        .build_unchecked();

    match spec.validate() {
        Err(DagremoteError::DagCycle(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains('a') || msg.contains('b'));
        }
        other => panic!("Expected DagCycle error, got: {:?}", other),
    }
}

#[test]
fn unknown_dependency_is_rejected() {
    let spec = WorkflowSpecBuilder::new()
        .command_stage("a", "echo a", &["NonExistent"])
        .build_unchecked();

    match spec.validate() {
        Err(DagremoteError::Workflow(msg)) => {
            assert!(msg.contains("unknown dependency 'NonExistent'"));
        }
        other => panic!("Expected Workflow error, got: {:?}", other),
    }
}

#[test]
fn duplicate_and_empty_documents_are_rejected() {
    let duplicate = WorkflowSpecBuilder::new()
        .command_stage("a", "echo a", &[])
        .command_stage("a", "echo again", &[])
        .build_unchecked();
    assert!(matches!(duplicate.validate(), Err(DagremoteError::Workflow(_))));

    let empty = WorkflowSpecBuilder::new().build_unchecked();
    assert!(matches!(empty.validate(), Err(DagremoteError::Workflow(_))));

    let self_loop = WorkflowSpecBuilder::new()
        .command_stage("a", "echo a", &["a"])
        .build_unchecked();
    assert!(self_loop.validate().is_err());
}

#[test]
fn graph_orders_stages_topologically() {
    let spec = WorkflowSpecBuilder::new()
        .command_stage("plot", "plot", &["fit"])
        .command_stage("fit", "fit", &["gen"])
        .command_stage("gen", "gen", &[])
        .build();

    let graph = StepGraph::from_workflow(&spec).unwrap();

    assert_eq!(graph.topological_order(), vec!["gen", "fit", "plot"]);
    assert_eq!(graph.dependents_of("gen"), ["fit".to_string()]);
    assert_eq!(graph.submittable(), vec!["gen".to_string()]);
    assert!(graph.running().is_empty());
}

#[test]
fn parameters_decode_from_base64_object() {
    let encoded = STANDARD.encode(r#"{"dataset": "ttbar", "events": 10}"#);

    let params = decode_parameters(&encoded).unwrap();

    assert_eq!(params["dataset"], json!("ttbar"));
    assert_eq!(params["events"], json!(10));
}

#[test]
fn non_object_parameters_are_rejected() {
    let encoded = STANDARD.encode("[1, 2, 3]");

    assert!(matches!(
        decode_parameters(&encoded),
        Err(DagremoteError::Workflow(_))
    ));
    assert!(matches!(
        decode_parameters("not base64!"),
        Err(DagremoteError::Base64Error(_))
    ));
}

#[test]
fn stage_names_that_escape_the_workspace_are_rejected() {
    for name in ["../x", "a/b", "..", ".", "a\\b"] {
        let spec = WorkflowSpecBuilder::new()
            .command_stage(name, "true", &[])
            .build_unchecked();

        match spec.validate() {
            Err(DagremoteError::Workflow(msg)) => {
                assert!(msg.contains("path separators"), "{name}: {msg}");
            }
            other => panic!("Expected Workflow error for '{name}', got: {:?}", other),
        }
    }

    let dotted = WorkflowSpecBuilder::new()
        .command_stage("fit.v2..final", "true", &[])
        .build_unchecked();
    assert!(dotted.validate().is_ok());
}
