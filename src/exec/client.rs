// src/exec/client.rs

//! Client for the remote job controller.
//!
//! The backend talks to a [`JobController`] instead of raw HTTP so tests can
//! swap in a fake controller. [`HttpJobController`] is the production
//! implementation. It is a plain request/response client: no retry and no
//! caching.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::exec::resources::ResourceHints;

/// Why a call to the job controller failed.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),

    /// Used by non-HTTP implementations (e.g. test doubles).
    #[error("{0}")]
    Unavailable(String),
}

/// Flat job submission payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSubmission {
    pub workflow_uuid: String,
    pub image: String,
    pub cmd: String,
    pub prettified_cmd: String,
    pub workflow_workspace: String,
    pub job_name: String,
    pub cvmfs_mounts: String,
    #[serde(flatten)]
    pub resources: ResourceHints,
}

pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// Request/response boundary to the remote job-execution service.
pub trait JobController: Send + Sync {
    /// Submit a job, returning the controller's job identifier.
    fn submit<'a>(&'a self, submission: &'a JobSubmission) -> RemoteFuture<'a, String>;

    /// Current status string of a job.
    fn check_status<'a>(&'a self, job_id: &'a str) -> RemoteFuture<'a, String>;

    /// Logs of a job.
    fn get_logs<'a>(&'a self, job_id: &'a str) -> RemoteFuture<'a, String>;
}

impl<T: JobController + ?Sized> JobController for Arc<T> {
    fn submit<'a>(&'a self, submission: &'a JobSubmission) -> RemoteFuture<'a, String> {
        (**self).submit(submission)
    }

    fn check_status<'a>(&'a self, job_id: &'a str) -> RemoteFuture<'a, String> {
        (**self).check_status(job_id)
    }

    fn get_logs<'a>(&'a self, job_id: &'a str) -> RemoteFuture<'a, String> {
        (**self).get_logs(job_id)
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct LogsResponse {
    logs: String,
}

/// Job controller reached over its REST API.
///
/// - `POST {base}/jobs` with the submission as JSON, answers `{"job_id": ..}`
/// - `GET {base}/jobs/{id}` answers `{"status": ..}`
/// - `GET {base}/jobs/{id}/logs` answers `{"logs": ..}`
#[derive(Debug, Clone)]
pub struct HttpJobController {
    base_url: String,
    http: reqwest::Client,
}

impl HttpJobController {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("dagremote/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    fn job_url(&self, job_id: &str) -> String {
        format!("{}/jobs/{}", self.base_url, job_id)
    }
}

impl JobController for HttpJobController {
    fn submit<'a>(&'a self, submission: &'a JobSubmission) -> RemoteFuture<'a, String> {
        Box::pin(async move {
            let url = format!("{}/jobs", self.base_url);
            debug!(%url, job_name = %submission.job_name, "POST job submission");

            let response: SubmitResponse = self
                .http
                .post(&url)
                .json(submission)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if response.job_id.trim().is_empty() {
                return Err(RemoteError::Malformed(
                    "job controller returned an empty job_id".to_string(),
                ));
            }
            Ok(response.job_id)
        })
    }

    fn check_status<'a>(&'a self, job_id: &'a str) -> RemoteFuture<'a, String> {
        Box::pin(async move {
            let response: StatusResponse = self
                .http
                .get(self.job_url(job_id))
                .header("cache-control", "no-cache")
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok(response.status)
        })
    }

    fn get_logs<'a>(&'a self, job_id: &'a str) -> RemoteFuture<'a, String> {
        Box::pin(async move {
            let response: LogsResponse = self
                .http
                .get(format!("{}/logs", self.job_url(job_id)))
                .header("cache-control", "no-cache")
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok(response.logs)
        })
    }
}
