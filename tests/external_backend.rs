// tests/external_backend.rs

use std::error::Error;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};
use tempfile::TempDir;

use dagremote::errors::DagremoteError;
use dagremote::exec::{BackendConfig, ExternalBackend, JobHandle};
use dagremote::step::{PublisherSpec, StepMetadata, StepSpec, StepState};
use dagremote::types::{JobStatus, WorkflowStatus};
use dagremote_test_utils::builders::StepSpecBuilder;
use dagremote_test_utils::fake_controller::FakeJobController;
use dagremote_test_utils::init_tracing;
use dagremote_test_utils::recording_publisher::RecordingPublisher;

type TestResult = Result<(), Box<dyn Error>>;

fn backend(
    workspace: &Path,
    controller: &FakeJobController,
    publisher: &RecordingPublisher,
) -> ExternalBackend<FakeJobController, RecordingPublisher> {
    ExternalBackend::new(
        BackendConfig {
            workflow_uuid: "wf-1".to_string(),
            workflow_workspace: workspace.to_string_lossy().into_owned(),
            mount_cvmfs: "false".to_string(),
        },
        controller.clone(),
        publisher.clone(),
    )
}

fn meta(name: &str) -> StepMetadata {
    StepMetadata {
        name: name.to_string(),
    }
}

async fn submit_step(
    backend: &mut ExternalBackend<FakeJobController, RecordingPublisher>,
    workspace: &Path,
    name: &str,
    spec: &StepSpec,
    parameters: Map<String, Value>,
) -> dagremote::errors::Result<JobHandle> {
    let state = StepState::for_step(workspace, name);
    backend.submit(spec, &parameters, &state, &meta(name)).await
}

#[tokio::test]
async fn script_step_is_submitted_with_tagged_image_and_wrapped_command() -> TestResult {
    init_tracing();

    let dir = TempDir::new()?;
    let controller = FakeJobController::new();
    let publisher = RecordingPublisher::new();
    let mut backend = backend(dir.path(), &controller, &publisher);

    let spec = StepSpecBuilder::script("echo hi", "bash")
        .image("myimg", "v1")
        .resource(json!({"compute_backend": "kubernetes"}))
        .build();

    let handle = submit_step(&mut backend, dir.path(), "hello", &spec, Map::new()).await?;

    assert_eq!(handle.job_id, "job-1");

    let submissions = controller.submissions();
    assert_eq!(submissions.len(), 1);
    let sub = &submissions[0];
    assert_eq!(sub.image, "myimg:v1");
    assert_eq!(
        sub.cmd,
        format!("echo {}|base64 -d|bash", STANDARD.encode("echo hi"))
    );
    assert_eq!(sub.prettified_cmd, "echo hi");
    assert_eq!(sub.job_name, "hello");
    assert_eq!(sub.workflow_uuid, "wf-1");

    let payload = serde_json::to_value(sub)?;
    assert_eq!(payload["compute_backend"], json!("kubernetes"));
    assert!(payload.get("kerberos").is_none());

    assert!(dir.path().join("hello").is_dir());
    Ok(())
}

#[tokio::test]
async fn submit_announces_running_job() -> TestResult {
    let dir = TempDir::new()?;
    let controller = FakeJobController::new();
    let publisher = RecordingPublisher::new();
    let mut backend = backend(dir.path(), &controller, &publisher);

    let spec = StepSpecBuilder::command("true").build();
    submit_step(&mut backend, dir.path(), "a", &spec, Map::new()).await?;

    let message = publisher.last().expect("a status message was published");
    assert_eq!(message.workflow_uuid, "wf-1");
    assert_eq!(message.status, WorkflowStatus::Running);
    assert_eq!(
        message.message,
        Some(json!({"progress": {"running": {"total": 1, "job_ids": ["job-1"]}}}))
    );
    Ok(())
}

#[tokio::test]
async fn publish_failure_does_not_fail_submit() -> TestResult {
    init_tracing();

    let dir = TempDir::new()?;
    let controller = FakeJobController::new();
    let publisher = RecordingPublisher::failing();
    let mut backend = backend(dir.path(), &controller, &publisher);

    let spec = StepSpecBuilder::command("true").build();
    let handle = submit_step(&mut backend, dir.path(), "a", &spec, Map::new()).await?;

    assert_eq!(handle.job_id, "job-1");
    assert_eq!(publisher.messages().len(), 1);
    Ok(())
}

#[tokio::test]
async fn rejected_submission_is_a_labelled_remote_call_error() -> TestResult {
    let dir = TempDir::new()?;
    let controller = FakeJobController::new().failing_submit("broken");
    let publisher = RecordingPublisher::new();
    let mut backend = backend(dir.path(), &controller, &publisher);

    let spec = StepSpecBuilder::command("true").build();
    let result = submit_step(&mut backend, dir.path(), "broken", &spec, Map::new()).await;

    match result {
        Err(DagremoteError::RemoteCall { context, .. }) => {
            assert_eq!(context, "submit job 'broken'");
        }
        other => panic!("Expected RemoteCall error, got: {:?}", other),
    }
    assert!(publisher.messages().is_empty());
    Ok(())
}

#[tokio::test]
async fn malformed_step_fails_before_reaching_the_controller() -> TestResult {
    let dir = TempDir::new()?;
    let controller = FakeJobController::new();
    let publisher = RecordingPublisher::new();
    let mut backend = backend(dir.path(), &controller, &publisher);

    let spec = StepSpecBuilder::with_process(Default::default()).build();
    let result = submit_step(&mut backend, dir.path(), "empty", &spec, Map::new()).await;

    assert!(matches!(result, Err(DagremoteError::MalformedStep(_))));
    assert!(controller.submissions().is_empty());
    Ok(())
}

#[tokio::test]
async fn command_template_is_interpolated_with_contextualised_parameters() -> TestResult {
    let dir = TempDir::new()?;
    let controller = FakeJobController::new();
    let publisher = RecordingPublisher::new();
    let mut backend = backend(dir.path(), &controller, &publisher);

    let spec = StepSpecBuilder::command("fit --input {data} --out {workdir}/result.json").build();
    let mut parameters = Map::new();
    parameters.insert("data".to_string(), json!("{workdir}/data.root"));

    let handle = submit_step(&mut backend, dir.path(), "fit", &spec, parameters).await?;

    let workdir = dir.path().join("fit");
    let workdir = workdir.to_string_lossy();
    assert_eq!(
        controller.submissions()[0].cmd,
        format!("fit --input {workdir}/data.root --out {workdir}/result.json")
    );
    assert_eq!(handle.pars["data"], json!(format!("{workdir}/data.root")));
    Ok(())
}

#[tokio::test]
async fn ready_and_successful_follow_the_job_status() -> TestResult {
    let dir = TempDir::new()?;
    let controller = FakeJobController::new()
        .with_statuses("ok", &["started", "finished"])
        .with_statuses("bad", &["failed"]);
    let publisher = RecordingPublisher::new();
    let mut backend = backend(dir.path(), &controller, &publisher);
    let spec = StepSpecBuilder::command("true").build();

    let ok = submit_step(&mut backend, dir.path(), "ok", &spec, Map::new()).await?;
    let bad = submit_step(&mut backend, dir.path(), "bad", &spec, Map::new()).await?;

    assert!(!backend.ready(&ok).await?);
    assert!(backend.ready(&ok).await?);
    assert!(backend.successful(&ok).await?);
    assert_eq!(backend.cached_status(&ok.job_id), Some(&JobStatus::Finished));

    assert!(backend.ready(&bad).await?);
    assert!(!backend.successful(&bad).await?);

    assert_eq!(controller.status_calls(&ok.job_id), 2);
    assert_eq!(controller.status_calls(&bad.job_id), 1);
    Ok(())
}

#[tokio::test]
async fn result_runs_the_publisher() -> TestResult {
    let dir = TempDir::new()?;
    let controller = FakeJobController::new();
    let publisher = RecordingPublisher::new();
    let mut backend = backend(dir.path(), &controller, &publisher);

    let spec = StepSpecBuilder::command("true")
        .publisher(PublisherSpec::Interpolated {
            publish: [("histogram".to_string(), json!("{workdir}/{name}.png"))]
                .into_iter()
                .collect(),
        })
        .build();
    let mut parameters = Map::new();
    parameters.insert("name".to_string(), json!("mass"));

    let mut handle = submit_step(&mut backend, dir.path(), "plot", &spec, parameters).await?;
    let outputs = backend.result(&mut handle)?;

    let expected = format!("{}/mass.png", dir.path().join("plot").to_string_lossy());
    assert_eq!(outputs, json!({"histogram": expected}));
    Ok(())
}

#[tokio::test]
async fn fail_info_reports_status_and_logs() -> TestResult {
    let dir = TempDir::new()?;
    let controller = FakeJobController::new()
        .with_statuses("bad", &["failed"])
        .with_logs("bad", "segmentation fault");
    let publisher = RecordingPublisher::new();
    let mut backend = backend(dir.path(), &controller, &publisher);
    let spec = StepSpecBuilder::command("true").build();

    let handle = submit_step(&mut backend, dir.path(), "bad", &spec, Map::new()).await?;
    backend.successful(&handle).await?;

    let info = backend.fail_info(&handle).await;

    assert!(info.contains("job-1"));
    assert!(info.contains("'failed'"));
    assert!(info.contains("segmentation fault"));
    Ok(())
}

#[tokio::test]
async fn fail_info_never_fails_when_logs_are_unavailable() -> TestResult {
    let dir = TempDir::new()?;
    let controller = FakeJobController::new().failing_logs();
    let publisher = RecordingPublisher::new();
    let mut backend = backend(dir.path(), &controller, &publisher);
    let spec = StepSpecBuilder::command("true").build();

    let handle = submit_step(&mut backend, dir.path(), "a", &spec, Map::new()).await?;
    let info = backend.fail_info(&handle).await;

    assert!(info.contains("has no known status"));
    assert!(info.contains("could not fetch logs"));
    Ok(())
}

#[tokio::test]
async fn job_handle_survives_json_round_trip() -> TestResult {
    let dir = TempDir::new()?;
    let controller = FakeJobController::new();
    let publisher = RecordingPublisher::new();
    let mut backend = backend(dir.path(), &controller, &publisher);
    let spec = StepSpecBuilder::command("true").build();

    let handle = submit_step(&mut backend, dir.path(), "a", &spec, Map::new()).await?;
    let serialised = handle.json();

    assert_eq!(serialised["proxyname"], json!("ExternalProxy"));
    assert_eq!(serialised["proxydetails"]["job_id"], json!("job-1"));
    assert_eq!(JobHandle::from_json(&serialised)?, handle);

    assert!(JobHandle::from_json(&json!({"proxyname": "ExternalProxy"})).is_err());
    Ok(())
}
