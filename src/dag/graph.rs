// src/dag/graph.rs

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::dag::view::{DagView, NodeState, NodeView};
use crate::dag::workflow::{StageSpec, WorkflowSpec, topological_stage_order};
use crate::errors::Result;
use crate::exec::JobHandle;

/// A stage of the workflow plus its mutable run state.
#[derive(Debug, Clone)]
pub struct StepNode {
    pub stage: StageSpec,
    /// Direct dependencies: stages that must succeed before this one can run.
    deps: Vec<String>,
    /// Direct dependents: stages that depend on this one.
    dependents: Vec<String>,
    pub state: NodeState,
    pub handle: Option<JobHandle>,
    pub outputs: Option<Value>,
}

impl StepNode {
    pub fn name(&self) -> &str {
        &self.stage.name
    }

    pub fn deps(&self) -> &[String] {
        &self.deps
    }
}

/// In-memory DAG of workflow stages keyed by stage name.
///
/// Acyclicity is checked on construction; the topological order is
/// computed once and reused for every traversal.
#[derive(Debug, Clone)]
pub struct StepGraph {
    nodes: HashMap<String, StepNode>,
    order: Vec<String>,
}

impl StepGraph {
    /// Build the DAG from a workflow document.
    pub fn from_workflow(spec: &WorkflowSpec) -> Result<Self> {
        spec.validate()?;
        let order = topological_stage_order(spec)?;

        let mut nodes: HashMap<String, StepNode> = HashMap::new();

        // First pass: create nodes with their dependency lists.
        for stage in &spec.stages {
            nodes.insert(
                stage.name.clone(),
                StepNode {
                    stage: stage.clone(),
                    deps: stage.dependencies.clone(),
                    dependents: Vec::new(),
                    state: NodeState::Defined,
                    handle: None,
                    outputs: None,
                },
            );
        }

        // Second pass: populate dependents in topological order so that the
        // lists are deterministic.
        for name in &order {
            let deps = nodes
                .get(name)
                .map(|n| n.deps.clone())
                .unwrap_or_default();

            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }

        Ok(Self { nodes, order })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&StepNode> {
        self.nodes.get(name)
    }

    /// Nodes in topological order.
    pub fn nodes_in_order(&self) -> impl Iterator<Item = &StepNode> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }

    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_state(&mut self, name: &str, state: NodeState) {
        if let Some(node) = self.nodes.get_mut(name) {
            node.state = state;
        }
    }

    pub fn set_handle(&mut self, name: &str, handle: JobHandle) {
        if let Some(node) = self.nodes.get_mut(name) {
            node.handle = Some(handle);
        }
    }

    pub fn set_outputs(&mut self, name: &str, outputs: Value) {
        if let Some(node) = self.nodes.get_mut(name) {
            node.outputs = Some(outputs);
        }
    }

    /// Names of running nodes, in topological order.
    pub fn running(&self) -> Vec<String> {
        self.nodes_in_order()
            .filter(|n| n.state == NodeState::Running)
            .map(|n| n.stage.name.clone())
            .collect()
    }

    /// Names of not-yet-submitted nodes whose dependencies all succeeded,
    /// in topological order.
    pub fn submittable(&self) -> Vec<String> {
        self.nodes_in_order()
            .filter(|n| n.state == NodeState::Defined)
            .filter(|n| n.deps.iter().all(|dep| self.ran_and_succeeded(dep)))
            .map(|n| n.stage.name.clone())
            .collect()
    }
}

impl DagView for StepGraph {
    fn topological_order(&self) -> Vec<String> {
        self.order.clone()
    }

    fn node(&self, id: &str) -> Option<NodeView<'_>> {
        self.nodes.get(id).map(|n| NodeView {
            id: n.stage.name.as_str(),
            name: n.stage.name.as_str(),
            state: n.state,
            pure_publishing: n.stage.pure_publishing,
            job_id: n.handle.as_ref().map(|h| h.job_id.as_str()),
        })
    }

    fn dependencies_of(&self, id: &str) -> Vec<String> {
        self.nodes
            .get(id)
            .map(|n| n.deps.clone())
            .unwrap_or_default()
    }

    /// Forward walk from every failed node along the dependent lists.
    fn blocked_by_failure(&self) -> HashSet<String> {
        let mut blocked = HashSet::new();
        let mut frontier: Vec<&str> = self
            .nodes_in_order()
            .filter(|n| n.state == NodeState::Failed)
            .map(StepNode::name)
            .collect();

        while let Some(name) = frontier.pop() {
            for dependent in self.dependents_of(name) {
                if blocked.insert(dependent.clone()) {
                    frontier.push(dependent);
                }
            }
        }
        blocked
    }

    fn edges(&self) -> Vec<(String, String)> {
        self.nodes_in_order()
            .flat_map(|n| {
                n.deps
                    .iter()
                    .map(move |dep| (dep.clone(), n.stage.name.clone()))
            })
            .collect()
    }
}
