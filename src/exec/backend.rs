// src/exec/backend.rs

//! The job-execution backend the DAG engine drives.
//!
//! [`ExternalBackend`] provides the capability set the engine needs from a
//! backend:
//! - `submit`: build, encode and submit a step as a remote job
//! - `ready` / `successful`: poll the job through the status cache
//! - `result`: publish the step's outputs once the job is done
//! - `fail_info`: free-form diagnostics for a failed job
//!
//! The engine calls into the backend strictly sequentially, so the status
//! cache is plain owned state behind `&mut self`.

use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::errors::{DagremoteError, Result};
use crate::exec::cache::JobStatusCache;
use crate::exec::client::{JobController, JobSubmission};
use crate::exec::encoder::encode_command;
use crate::exec::handle::JobHandle;
use crate::exec::resources::ResourceHints;
use crate::progress::publisher::{StatusMessage, StatusPublisher};
use crate::step::{StepMetadata, StepSpec, StepState, build_job, contextualize_parameters, publish};
use crate::types::{JobStatus, WorkflowStatus};

/// Per-workflow settings copied into every submission.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub workflow_uuid: String,
    pub workflow_workspace: String,
    pub mount_cvmfs: String,
}

pub struct ExternalBackend<C, P> {
    config: BackendConfig,
    client: C,
    publisher: P,
    cache: JobStatusCache,
}

impl<C, P> std::fmt::Debug for ExternalBackend<C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalBackend")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<C: JobController, P: StatusPublisher> ExternalBackend<C, P> {
    pub fn new(config: BackendConfig, client: C, publisher: P) -> Self {
        Self {
            config,
            client,
            publisher,
            cache: JobStatusCache::new(),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Last cached status of a job, without querying the controller.
    pub fn cached_status(&self, job_id: &str) -> Option<&JobStatus> {
        self.cache.get(job_id)
    }

    /// Build the submission payload for a step without sending it.
    ///
    /// `parameters` must already be contextualised against `state`.
    pub fn build_submission(
        &self,
        spec: &StepSpec,
        parameters: &Map<String, Value>,
        state: &StepState,
        metadata: &StepMetadata,
    ) -> Result<JobSubmission> {
        let job = build_job(&spec.process, parameters, state)?;
        let command = encode_command(&job)?;

        Ok(JobSubmission {
            workflow_uuid: self.config.workflow_uuid.clone(),
            image: spec.environment.image_reference(),
            cmd: command.wrapped,
            prettified_cmd: command.prettified,
            workflow_workspace: self.config.workflow_workspace.clone(),
            job_name: metadata.name.clone(),
            cvmfs_mounts: self.config.mount_cvmfs.clone(),
            resources: ResourceHints::from_entries(&spec.environment.resources),
        })
    }

    /// Submit a step as a remote job.
    ///
    /// A failure to announce the running job on the status bus is logged and
    /// does not fail the submission.
    pub async fn submit(
        &mut self,
        spec: &StepSpec,
        parameters: &Map<String, Value>,
        state: &StepState,
        metadata: &StepMetadata,
    ) -> Result<JobHandle> {
        let parameters = contextualize_parameters(parameters, state);
        let submission = self.build_submission(spec, &parameters, state, metadata)?;

        debug!(
            job_name = %submission.job_name,
            image = %submission.image,
            cmd = %submission.prettified_cmd,
            "prepared job submission"
        );

        state.ensure()?;

        let job_id = self
            .client
            .submit(&submission)
            .await
            .map_err(|e| DagremoteError::remote(format!("submit job '{}'", metadata.name), e))?;

        info!(
            workflow_uuid = %self.config.workflow_uuid,
            job_name = %metadata.name,
            %job_id,
            "submitted job"
        );

        self.announce_running(&job_id).await;

        Ok(JobHandle {
            job_id,
            spec: spec.clone(),
            pars: parameters,
            state: state.clone(),
        })
    }

    /// `true` once the job has left the `started` state.
    pub async fn ready(&mut self, handle: &JobHandle) -> Result<bool> {
        Ok(self.get_state(handle).await?.is_terminal())
    }

    /// `true` iff the job finished successfully.
    pub async fn successful(&mut self, handle: &JobHandle) -> Result<bool> {
        Ok(self.get_state(handle).await?.is_success())
    }

    /// Publish the step's outputs. Only meaningful once `ready` is true.
    pub fn result(&self, handle: &mut JobHandle) -> Result<Value> {
        handle.pars = contextualize_parameters(&handle.pars, &handle.state);
        publish(&handle.spec.publisher, &handle.pars, &handle.state)
    }

    /// Diagnostic text for a job. Never fails; problems end up in the text.
    pub async fn fail_info(&self, handle: &JobHandle) -> String {
        let mut info = format!("job {}", handle.job_id);

        match self.cache.get(&handle.job_id) {
            Some(status) => info.push_str(&format!(" ended with status '{status}'")),
            None => info.push_str(" has no known status"),
        }

        match self.client.get_logs(&handle.job_id).await {
            Ok(logs) if logs.trim().is_empty() => info.push_str("; no logs available"),
            Ok(logs) => {
                info.push_str("; logs:\n");
                info.push_str(&logs);
            }
            Err(e) => info.push_str(&format!("; could not fetch logs: {e}")),
        }

        info
    }

    async fn get_state(&mut self, handle: &JobHandle) -> Result<JobStatus> {
        self.cache.get_or_fetch(&self.client, &handle.job_id).await
    }

    async fn announce_running(&self, job_id: &str) {
        let message = StatusMessage::new(&self.config.workflow_uuid, WorkflowStatus::Running)
            .with_message(json!({
                "progress": {
                    "running": { "total": 1, "job_ids": [job_id] }
                }
            }));

        if let Err(e) = self.publisher.publish(&message).await {
            warn!(
                workflow_uuid = %self.config.workflow_uuid,
                %job_id,
                error = %e,
                "could not publish running status for submitted job"
            );
        }
    }
}
