// src/engine/run.rs

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::dag::{NodeState, StepGraph};
use crate::exec::{ExternalBackend, JobController};
use crate::progress::{ProgressTracker, StatusPublisher};
use crate::step::{StepMetadata, StepState, contextualize_parameters, publish};

use super::{RunOptions, RunOutcome};

/// Drives one workflow DAG to completion, one tick at a time.
///
/// Every tick:
/// 1. polls running nodes through the backend and collects their results
/// 2. submits nodes whose dependencies all succeeded
/// 3. lets the tracker observe the DAG
///
/// The run ends when nothing is running and nothing can be submitted.
/// Nodes behind a failed dependency are never submitted.
pub struct WorkflowRun<C, P> {
    graph: StepGraph,
    backend: ExternalBackend<C, P>,
    tracker: ProgressTracker<P>,
    workspace: PathBuf,
    init_parameters: Map<String, Value>,
    options: RunOptions,
}

impl<C, P> fmt::Debug for WorkflowRun<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowRun")
            .field("workspace", &self.workspace)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<C: JobController, P: StatusPublisher> WorkflowRun<C, P> {
    pub fn new(
        graph: StepGraph,
        backend: ExternalBackend<C, P>,
        tracker: ProgressTracker<P>,
        workspace: PathBuf,
        init_parameters: Map<String, Value>,
        options: RunOptions,
    ) -> Self {
        Self {
            graph,
            backend,
            tracker,
            workspace,
            init_parameters,
            options,
        }
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    /// Run the workflow to completion.
    pub async fn run(mut self) -> RunOutcome {
        info!(
            workflow_uuid = %self.tracker.workflow_uuid(),
            stages = self.graph.len(),
            "workflow run started"
        );

        self.tracker.initialize(&self.graph).await;

        loop {
            if !self.tick().await {
                break;
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }

        self.tracker.finalize(&self.graph).await;

        let outcome = if self.tracker.workflow_failed() {
            RunOutcome::Failed
        } else {
            RunOutcome::Finished
        };
        info!(?outcome, "workflow run finished");
        outcome
    }

    /// One scheduling tick. Returns `false` once the DAG is settled.
    pub async fn tick(&mut self) -> bool {
        self.poll_running().await;
        self.submit_ready().await;
        self.tracker.track(&self.graph).await;

        let settled = self.graph.running().is_empty() && self.graph.submittable().is_empty();
        if settled {
            debug!("no running or submittable stages left");
        }
        !settled
    }

    async fn poll_running(&mut self) {
        for name in self.graph.running() {
            let Some(mut handle) = self.graph.get(&name).and_then(|n| n.handle.clone()) else {
                warn!(stage = %name, "running stage has no job handle; marking failed");
                self.graph.set_state(&name, NodeState::Failed);
                continue;
            };

            match self.backend.ready(&handle).await {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    error!(stage = %name, job_id = %handle.job_id, error = %e, "status check failed");
                    self.graph.set_state(&name, NodeState::Failed);
                    continue;
                }
            }

            match self.backend.successful(&handle).await {
                Ok(true) => match self.backend.result(&mut handle) {
                    Ok(outputs) => {
                        info!(stage = %name, job_id = %handle.job_id, "stage finished");
                        self.graph.set_outputs(&name, outputs);
                        self.graph.set_state(&name, NodeState::Success);
                    }
                    Err(e) => {
                        error!(stage = %name, error = %e, "publishing stage outputs failed");
                        self.graph.set_state(&name, NodeState::Failed);
                    }
                },
                Ok(false) => {
                    let info = self.backend.fail_info(&handle).await;
                    warn!(stage = %name, %info, "stage failed");
                    self.graph.set_state(&name, NodeState::Failed);
                }
                Err(e) => {
                    error!(stage = %name, job_id = %handle.job_id, error = %e, "status check failed");
                    self.graph.set_state(&name, NodeState::Failed);
                }
            }

            self.graph.set_handle(&name, handle);
        }
    }

    async fn submit_ready(&mut self) {
        for name in self.graph.submittable() {
            let Some(stage) = self.graph.get(&name).map(|n| n.stage.clone()) else {
                continue;
            };

            let mut parameters = self.init_parameters.clone();
            parameters.extend(stage.parameters.clone());
            let state = StepState::for_step(&self.workspace, &name);

            if stage.pure_publishing {
                let parameters = contextualize_parameters(&parameters, &state);
                match publish(&stage.step.publisher, &parameters, &state) {
                    Ok(outputs) => {
                        debug!(stage = %name, "pure publishing stage done");
                        self.graph.set_outputs(&name, outputs);
                        self.graph.set_state(&name, NodeState::Success);
                    }
                    Err(e) => {
                        error!(stage = %name, error = %e, "pure publishing stage failed");
                        self.graph.set_state(&name, NodeState::Failed);
                    }
                }
                continue;
            }

            let metadata = StepMetadata { name: name.clone() };
            match self
                .backend
                .submit(&stage.step, &parameters, &state, &metadata)
                .await
            {
                Ok(handle) => {
                    self.graph.set_handle(&name, handle);
                    self.graph.set_state(&name, NodeState::Running);
                }
                Err(e) => {
                    error!(stage = %name, error = %e, "submitting stage failed");
                    self.graph.set_state(&name, NodeState::Failed);
                }
            }
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
        }
    }
}
