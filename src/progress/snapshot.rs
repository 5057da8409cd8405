// src/progress/snapshot.rs

use serde::Serialize;

/// Count plus job ids of the nodes in one progress bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressBucket {
    pub total: usize,
    pub job_ids: Vec<String>,
}

impl ProgressBucket {
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            job_ids: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, job_id: Option<&str>, keep_job_id: bool) {
        self.total += 1;
        if keep_job_id {
            if let Some(id) = job_id {
                self.job_ids.push(id.to_string());
            }
        }
    }
}

/// Point-in-time summary of a workflow's DAG.
///
/// Serialises to the `progress` payload of a running status message. It is
/// only ever built by the summarizer, so every bucket count is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Blocked by an upstream failure.
    pub planned: ProgressBucket,
    /// Not yet decided (waiting to be submitted).
    pub total: ProgressBucket,
    pub failed: ProgressBucket,
    pub running: ProgressBucket,
    pub finished: ProgressBucket,
    pub engine_specific: EngineRendering,
}

impl ProgressSnapshot {
    /// The per-bucket counts that decide whether a new snapshot is worth
    /// publishing. `planned` is deliberately not part of them.
    pub fn tracked_counts(&self) -> [usize; 4] {
        [
            self.running.total,
            self.finished.total,
            self.failed.total,
            self.total.total,
        ]
    }

    pub fn has_failures(&self) -> bool {
        self.failed.total != 0
    }
}

/// DAG shape for UI rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineRendering {
    pub dag: DagRendering,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DagRendering {
    /// `(upstream, downstream)` node ids.
    pub edges: Vec<(String, String)>,
    pub nodes: Vec<RenderedNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedNode {
    pub metadata: RenderedNodeMetadata,
    pub id: String,
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedNodeMetadata {
    pub name: String,
}
