use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use dagremote::exec::{JobController, JobSubmission, RemoteError, RemoteFuture};

/// An in-memory job controller that:
/// - records every submission and hands out ids `job-1`, `job-2`, ...
/// - answers status queries from a per-job-name script (the last scripted
///   status repeats; unscripted jobs report `finished`)
/// - counts status queries per job id
/// - can be told to reject submissions or log requests
#[derive(Clone, Default)]
pub struct FakeJobController {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    next_id: usize,
    submissions: Vec<JobSubmission>,
    names_by_id: HashMap<String, String>,
    scripts: HashMap<String, VecDeque<String>>,
    status_calls: HashMap<String, usize>,
    logs: HashMap<String, String>,
    failing_submits: HashSet<String>,
    fail_logs: bool,
}

impl FakeJobController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the statuses reported for the job named `job_name`.
    pub fn with_statuses(self, job_name: &str, statuses: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.scripts.insert(
                job_name.to_string(),
                statuses.iter().map(|s| s.to_string()).collect(),
            );
        }
        self
    }

    /// Logs returned for the job named `job_name`.
    pub fn with_logs(self, job_name: &str, logs: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.logs.insert(job_name.to_string(), logs.to_string());
        }
        self
    }

    /// Reject submissions of the job named `job_name`.
    pub fn failing_submit(self, job_name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.failing_submits.insert(job_name.to_string());
        }
        self
    }

    /// Reject every log request.
    pub fn failing_logs(self) -> Self {
        self.state.lock().unwrap().fail_logs = true;
        self
    }

    pub fn submissions(&self) -> Vec<JobSubmission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn submitted_names(&self) -> Vec<String> {
        self.submissions().into_iter().map(|s| s.job_name).collect()
    }

    pub fn status_calls(&self, job_id: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .status_calls
            .get(job_id)
            .copied()
            .unwrap_or(0)
    }
}

impl JobController for FakeJobController {
    fn submit<'a>(&'a self, submission: &'a JobSubmission) -> RemoteFuture<'a, String> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            if state.failing_submits.contains(&submission.job_name) {
                return Err(RemoteError::Unavailable(format!(
                    "controller refused job '{}'",
                    submission.job_name
                )));
            }

            state.next_id += 1;
            let job_id = format!("job-{}", state.next_id);
            state
                .names_by_id
                .insert(job_id.clone(), submission.job_name.clone());
            state.submissions.push(submission.clone());
            Ok(job_id)
        })
    }

    fn check_status<'a>(&'a self, job_id: &'a str) -> RemoteFuture<'a, String> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            *state.status_calls.entry(job_id.to_string()).or_insert(0) += 1;

            let Some(name) = state.names_by_id.get(job_id).cloned() else {
                return Err(RemoteError::Unavailable(format!("unknown job {job_id}")));
            };

            let status = match state.scripts.get_mut(&name) {
                Some(script) if script.len() > 1 => script.pop_front(),
                Some(script) => script.front().cloned(),
                None => None,
            };
            Ok(status.unwrap_or_else(|| "finished".to_string()))
        })
    }

    fn get_logs<'a>(&'a self, job_id: &'a str) -> RemoteFuture<'a, String> {
        Box::pin(async move {
            let state = self.state.lock().unwrap();
            if state.fail_logs {
                return Err(RemoteError::Unavailable("logs unavailable".to_string()));
            }
            let logs = state
                .names_by_id
                .get(job_id)
                .and_then(|name| state.logs.get(name))
                .cloned()
                .unwrap_or_default();
            Ok(logs)
        })
    }
}
