// src/progress/summarizer.rs

//! Classification of DAG nodes into progress buckets.

use crate::dag::{DagView, NodeState};
use crate::progress::snapshot::{
    DagRendering, EngineRendering, ProgressSnapshot, RenderedNode, RenderedNodeMetadata,
};

/// Progress bucket of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    Running,
    Finished,
    Failed,
    /// Blocked by an upstream failure.
    Planned,
    /// Scheduled but not yet decided.
    Total,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedNode {
    pub id: String,
    pub class: NodeClass,
    /// Only set for running, finished and failed nodes.
    pub job_id: Option<String>,
}

/// Classify every non-pure-publishing node, in topological order.
///
/// The checks run in a fixed order and the first match wins: a node that
/// is running is reported as running even if another predicate also holds.
pub fn classify_nodes<D: DagView + ?Sized>(dag: &D) -> Vec<ClassifiedNode> {
    let mut classified = Vec::new();
    let blocked = dag.blocked_by_failure();

    for id in dag.topological_order() {
        let Some(node) = dag.node(&id) else {
            continue;
        };
        if node.pure_publishing {
            continue;
        }

        let class = if node.state == NodeState::Running {
            NodeClass::Running
        } else if dag.ran_and_succeeded(&id) {
            NodeClass::Finished
        } else if dag.ran_and_failed(&id) {
            NodeClass::Failed
        } else if blocked.contains(&id) {
            NodeClass::Planned
        } else {
            NodeClass::Total
        };

        let job_id = match class {
            NodeClass::Running | NodeClass::Finished | NodeClass::Failed => {
                node.job_id.map(str::to_string)
            }
            NodeClass::Planned | NodeClass::Total => None,
        };

        classified.push(ClassifiedNode { id, class, job_id });
    }

    classified
}

/// Build a fresh progress snapshot of the DAG.
pub fn summarize<D: DagView + ?Sized>(dag: &D) -> ProgressSnapshot {
    let mut snapshot = ProgressSnapshot {
        engine_specific: render_dag(dag),
        ..ProgressSnapshot::default()
    };

    for node in classify_nodes(dag) {
        let job_id = node.job_id.as_deref();
        match node.class {
            NodeClass::Running => snapshot.running.record(job_id, true),
            NodeClass::Finished => snapshot.finished.record(job_id, true),
            NodeClass::Failed => snapshot.failed.record(job_id, true),
            NodeClass::Planned => snapshot.planned.record(job_id, false),
            NodeClass::Total => snapshot.total.record(job_id, false),
        }
    }

    snapshot
}

/// Edge list plus `{name, id, job id}` per node, for UI rendering.
pub fn render_dag<D: DagView + ?Sized>(dag: &D) -> EngineRendering {
    let nodes = dag
        .topological_order()
        .iter()
        .filter_map(|id| dag.node(id))
        .map(|node| RenderedNode {
            metadata: RenderedNodeMetadata {
                name: node.name.to_string(),
            },
            id: node.id.to_string(),
            job_id: node.job_id.map(str::to_string),
        })
        .collect();

    EngineRendering {
        dag: DagRendering {
            edges: dag.edges(),
            nodes,
        },
    }
}
