// src/dag/view.rs

//! Read-only view of the engine's DAG.
//!
//! The progress summarizer only ever reads the DAG through [`DagView`]; it
//! never builds or mutates topology. [`crate::dag::StepGraph`] is the
//! in-crate implementation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a DAG node, as owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// Not submitted yet.
    Defined,
    Running,
    Success,
    Failed,
}

/// Borrowed view of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub state: NodeState,
    /// Engine-internal nodes that only aggregate outputs.
    pub pure_publishing: bool,
    /// Remote job id, once the node has been submitted.
    pub job_id: Option<&'a str>,
}

pub trait DagView {
    /// Node ids in a deterministic topological order.
    fn topological_order(&self) -> Vec<String>;

    fn node(&self, id: &str) -> Option<NodeView<'_>>;

    /// Direct upstream nodes of `id`.
    fn dependencies_of(&self, id: &str) -> Vec<String>;

    /// All `(from, to)` edges, `from` being the upstream node.
    fn edges(&self) -> Vec<(String, String)>;

    fn ran_and_succeeded(&self, id: &str) -> bool {
        self.node(id)
            .is_some_and(|n| n.state == NodeState::Success)
    }

    fn ran_and_failed(&self, id: &str) -> bool {
        self.node(id)
            .is_some_and(|n| n.state == NodeState::Failed)
    }

    /// Whether any (transitive) upstream node ran and failed.
    ///
    /// Every ancestor is visited at most once.
    fn upstream_failure(&self, id: &str) -> bool {
        let mut seen = HashSet::new();
        let mut stack = self.dependencies_of(id);

        while let Some(dep) = stack.pop() {
            if !seen.insert(dep.clone()) {
                continue;
            }
            if self.ran_and_failed(&dep) {
                return true;
            }
            stack.extend(self.dependencies_of(&dep));
        }
        false
    }

    /// Ids of all nodes with a failed (transitive) upstream node.
    ///
    /// One pass over the topological order: a node is blocked when any
    /// direct dependency failed or is itself blocked.
    fn blocked_by_failure(&self) -> HashSet<String> {
        let mut blocked = HashSet::new();

        for id in self.topological_order() {
            let is_blocked = self
                .dependencies_of(&id)
                .iter()
                .any(|dep| blocked.contains(dep) || self.ran_and_failed(dep));
            if is_blocked {
                blocked.insert(id);
            }
        }
        blocked
    }
}
