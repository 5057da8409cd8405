// src/progress/tracker.rs

//! Progress tracker: publishes a DAG snapshot whenever it changes.

use serde_json::json;
use tracing::{debug, error, info};

use crate::dag::DagView;
use crate::progress::publisher::{StatusMessage, StatusPublisher};
use crate::progress::snapshot::ProgressSnapshot;
use crate::progress::summarizer::summarize;
use crate::types::WorkflowStatus;

/// Observes the DAG after every scheduling tick and forwards de-duplicated
/// progress snapshots to the status bus.
///
/// The tracker is uninitialized until the first snapshot is stored. Publish
/// failures are logged and never propagated.
pub struct ProgressTracker<P> {
    workflow_uuid: String,
    publisher: P,
    progress: Option<ProgressSnapshot>,
}

impl<P> std::fmt::Debug for ProgressTracker<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("workflow_uuid", &self.workflow_uuid)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl<P: StatusPublisher> ProgressTracker<P> {
    pub fn new(workflow_uuid: impl Into<String>, publisher: P) -> Self {
        let workflow_uuid = workflow_uuid.into();
        info!(%workflow_uuid, "initializing workflow progress tracker");
        Self {
            workflow_uuid,
            publisher,
            progress: None,
        }
    }

    pub fn workflow_uuid(&self) -> &str {
        &self.workflow_uuid
    }

    /// Last stored snapshot, if any.
    pub fn progress(&self) -> Option<&ProgressSnapshot> {
        self.progress.as_ref()
    }

    /// Take a first snapshot and publish it unconditionally.
    pub async fn initialize<D: DagView + ?Sized>(&mut self, dag: &D) {
        let snapshot = summarize(dag);
        self.update_progress_state(snapshot);
        self.publish_progress().await;
    }

    /// Take a snapshot and publish it if the tracked counts changed.
    pub async fn track<D: DagView + ?Sized>(&mut self, dag: &D) {
        let snapshot = summarize(dag);
        if self.workflow_progressed(&snapshot) {
            self.update_progress_state(snapshot);
            self.publish_progress().await;
        }
    }

    /// Track one last time, then publish the terminal workflow status.
    pub async fn finalize<D: DagView + ?Sized>(&mut self, dag: &D) {
        self.track(dag).await;

        let status = if self.workflow_failed() {
            WorkflowStatus::Failed
        } else {
            WorkflowStatus::Finished
        };

        info!(workflow_uuid = %self.workflow_uuid, %status, "workflow done");

        let message = StatusMessage::new(&self.workflow_uuid, status);
        self.publish_guarded(&message).await;
    }

    /// Whether `next` differs from the stored snapshot in any tracked count.
    ///
    /// Without a stored snapshot every snapshot counts as progress.
    pub fn workflow_progressed(&self, next: &ProgressSnapshot) -> bool {
        match &self.progress {
            Some(current) => current.tracked_counts() != next.tracked_counts(),
            None => true,
        }
    }

    /// Whether the stored snapshot reports failed nodes.
    ///
    /// A tracker without any snapshot reports failure: there is nothing to
    /// prove the workflow succeeded.
    pub fn workflow_failed(&self) -> bool {
        self.progress
            .as_ref()
            .is_none_or(ProgressSnapshot::has_failures)
    }

    pub fn update_progress_state(&mut self, snapshot: ProgressSnapshot) {
        self.progress = Some(snapshot);
    }

    async fn publish_progress(&self) {
        let Some(progress) = &self.progress else {
            return;
        };

        debug!(
            workflow_uuid = %self.workflow_uuid,
            running = progress.running.total,
            finished = progress.finished.total,
            failed = progress.failed.total,
            total = progress.total.total,
            planned = progress.planned.total,
            "sending progress information"
        );

        let message = StatusMessage::new(&self.workflow_uuid, WorkflowStatus::Running)
            .with_message(json!({ "progress": progress }));
        self.publish_guarded(&message).await;
    }

    async fn publish_guarded(&self, message: &StatusMessage) {
        if let Err(e) = self.publisher.publish(message).await {
            error!(
                workflow_uuid = %message.workflow_uuid,
                status = %message.status,
                payload = %message.to_json(),
                error = %e,
                "failed to publish workflow status"
            );
        }
    }
}
