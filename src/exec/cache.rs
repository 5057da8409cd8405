// src/exec/cache.rs

use std::collections::HashMap;

use tracing::debug;

use crate::errors::{DagremoteError, Result};
use crate::exec::client::JobController;
use crate::types::JobStatus;

/// Last observed status per job id.
///
/// An entry is refreshed from the controller only while it is missing or
/// still `started`. Once a terminal status is stored it never changes.
#[derive(Debug, Default)]
pub struct JobStatusCache {
    statuses: HashMap<String, JobStatus>,
}

impl JobStatusCache {
    pub fn new() -> Self {
        Self {
            statuses: HashMap::new(),
        }
    }

    pub fn get(&self, job_id: &str) -> Option<&JobStatus> {
        self.statuses.get(job_id)
    }

    /// Whether the controller has to be asked again for this job.
    pub fn needs_refresh(&self, job_id: &str) -> bool {
        self.statuses
            .get(job_id)
            .is_none_or(|status| !status.is_terminal())
    }

    /// Return the job's status, querying the controller if needed.
    pub async fn get_or_fetch<C>(&mut self, client: &C, job_id: &str) -> Result<JobStatus>
    where
        C: JobController + ?Sized,
    {
        if !self.needs_refresh(job_id) {
            if let Some(status) = self.statuses.get(job_id) {
                return Ok(status.clone());
            }
        }

        let raw = client.check_status(job_id).await.map_err(|e| {
            DagremoteError::remote(format!("check status of job {job_id}"), e)
        })?;
        let status = JobStatus::from(raw.as_str());

        if self.statuses.get(job_id) != Some(&status) {
            debug!(job_id, %status, "job status updated");
        }
        self.statuses.insert(job_id.to_string(), status.clone());
        Ok(status)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
