// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod progress;
pub mod step;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{AdapterConfig, load_and_validate};
use crate::dag::{StepGraph, WorkflowSpec, decode_parameters};
use crate::engine::{RunOptions, RunOutcome, WorkflowRun};
use crate::errors::DagremoteError;
use crate::exec::{BackendConfig, ExternalBackend, HttpJobController};
use crate::progress::{
    HttpStatusPublisher, LogStatusPublisher, ProgressTracker, StatusMessage, StatusPublisher,
};
use crate::types::WorkflowStatus;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - workflow + parameter decoding
/// - job controller client, status publisher, backend and tracker
/// - the workflow driver
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;
    let workspace = workspace_dir(&cfg, &args.workflow_workspace);

    if args.dry_run {
        let workflow = load_workflow(&args, &workspace)?;
        print_dry_run(&workflow, &workspace);
        return Ok(());
    }

    let publisher = status_publisher(&cfg);

    match execute(&args, &cfg, workspace, publisher.clone()).await {
        Ok(RunOutcome::Finished) => Ok(()),
        Ok(RunOutcome::Failed) => bail!("workflow {} failed", args.workflow_uuid),
        Err(e) => {
            error!(workflow_uuid = %args.workflow_uuid, error = %e, "workflow could not be run");
            let message = StatusMessage::new(&args.workflow_uuid, WorkflowStatus::Failed)
                .with_logs(format!("workflow failed: {e}"));
            if let Err(publish_err) = publisher.publish(&message).await {
                error!(error = %publish_err, "failed to publish workflow failure");
            }
            Err(e.into())
        }
    }
}

async fn execute(
    args: &CliArgs,
    cfg: &AdapterConfig,
    workspace: PathBuf,
    publisher: Arc<dyn StatusPublisher>,
) -> errors::Result<RunOutcome> {
    let workflow = load_workflow(args, &workspace)?;
    let parameters = match args.workflow_parameters.as_deref() {
        Some(encoded) => decode_parameters(encoded)?,
        None => Map::<String, Value>::new(),
    };
    let graph = StepGraph::from_workflow(&workflow)?;

    info!(
        workflow_uuid = %args.workflow_uuid,
        workspace = %workspace.display(),
        stages = graph.len(),
        "starting workflow"
    );

    let backend = ExternalBackend::new(
        BackendConfig {
            workflow_uuid: args.workflow_uuid.clone(),
            workflow_workspace: workspace.to_string_lossy().into_owned(),
            mount_cvmfs: cfg.workspace.mount_cvmfs.clone(),
        },
        HttpJobController::new(&cfg.job_controller.url),
        publisher.clone(),
    );
    let tracker = ProgressTracker::new(&args.workflow_uuid, publisher);

    let run = WorkflowRun::new(
        graph,
        backend,
        tracker,
        workspace,
        parameters,
        RunOptions::from_config(cfg),
    );
    Ok(run.run().await)
}

/// `<shared volume>/<workflow workspace>`.
fn workspace_dir(cfg: &AdapterConfig, workflow_workspace: &str) -> PathBuf {
    Path::new(&cfg.workspace.shared_volume_path).join(workflow_workspace)
}

/// Resolve the workflow document: inline base64 JSON first, then a file
/// relative to the workspace.
fn load_workflow(args: &CliArgs, workspace: &Path) -> errors::Result<WorkflowSpec> {
    if let Some(encoded) = args.workflow_json.as_deref() {
        debug!("decoding inline workflow document");
        return WorkflowSpec::from_base64(encoded);
    }
    if let Some(file) = args.workflow_file.as_deref() {
        let path = workspace.join(file);
        debug!(path = %path.display(), "reading workflow document");
        return WorkflowSpec::from_path(path);
    }
    Err(DagremoteError::ConfigError(
        "either --workflow-json or --workflow-file is required".to_string(),
    ))
}

fn status_publisher(cfg: &AdapterConfig) -> Arc<dyn StatusPublisher> {
    match cfg.status_bus.url.as_deref() {
        Some(url) => Arc::new(HttpStatusPublisher::new(url)),
        None => {
            info!("no status bus configured; status messages go to the log");
            Arc::new(LogStatusPublisher)
        }
    }
}

/// Simple dry-run output: print stages, deps and commands.
fn print_dry_run(workflow: &WorkflowSpec, workspace: &Path) {
    println!("dagremote dry-run");
    println!("  workspace = {}", workspace.display());
    println!();

    println!("stages ({}):", workflow.stages.len());
    for stage in &workflow.stages {
        println!("  - {}", stage.name);
        println!("      image: {}", stage.step.environment.image_reference());
        if let Some(ref cmd) = stage.step.process.command {
            println!("      command: {cmd}");
        }
        if let Some(ref script) = stage.step.process.script {
            let interpreter = stage.step.process.interpreter.as_deref().unwrap_or("?");
            println!("      script ({interpreter}): {} bytes", script.len());
        }
        if !stage.dependencies.is_empty() {
            println!("      dependencies: {:?}", stage.dependencies);
        }
        if stage.pure_publishing {
            println!("      pure_publishing: true");
        }
    }

    debug!("dry-run complete (no submission)");
}
