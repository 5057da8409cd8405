use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Workflow-level status codes shared with the rest of the platform.
///
/// The numeric codes are what goes over the wire to the status bus. This
/// adapter itself only ever emits `Running`, `Finished` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Created,
    Running,
    Finished,
    Failed,
    Deleted,
    Stopped,
    Queued,
    Pending,
}

impl WorkflowStatus {
    pub fn code(self) -> u8 {
        match self {
            WorkflowStatus::Created => 0,
            WorkflowStatus::Running => 1,
            WorkflowStatus::Finished => 2,
            WorkflowStatus::Failed => 3,
            WorkflowStatus::Deleted => 4,
            WorkflowStatus::Stopped => 5,
            WorkflowStatus::Queued => 6,
            WorkflowStatus::Pending => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        let status = match code {
            0 => WorkflowStatus::Created,
            1 => WorkflowStatus::Running,
            2 => WorkflowStatus::Finished,
            3 => WorkflowStatus::Failed,
            4 => WorkflowStatus::Deleted,
            5 => WorkflowStatus::Stopped,
            6 => WorkflowStatus::Queued,
            7 => WorkflowStatus::Pending,
            _ => return None,
        };
        Some(status)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowStatus::Created => "created",
            WorkflowStatus::Running => "running",
            WorkflowStatus::Finished => "finished",
            WorkflowStatus::Failed => "failed",
            WorkflowStatus::Deleted => "deleted",
            WorkflowStatus::Stopped => "stopped",
            WorkflowStatus::Queued => "queued",
            WorkflowStatus::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// Status of a single remote job as reported by the job controller.
///
/// `Started` is the only transient value: every other status is terminal
/// and is never polled again once observed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Started,
    Finished,
    Failed,
    /// Any other value reported by the controller (e.g. `stopped`).
    Other(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Started)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Finished)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Started => "started",
            JobStatus::Finished => "finished",
            JobStatus::Failed => "failed",
            JobStatus::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "started" => JobStatus::Started,
            "finished" => JobStatus::Finished,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(JobStatus::from(s))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
