use dagremote::dag::{DagView, NodeState, NodeView};

struct FakeNode {
    id: String,
    state: NodeState,
    pure_publishing: bool,
    job_id: Option<String>,
    deps: Vec<String>,
}

/// A hand-assembled DAG for summarizer and tracker tests.
///
/// Nodes must be added after their dependencies; insertion order is the
/// topological order.
#[derive(Default)]
pub struct FakeDag {
    nodes: Vec<FakeNode>,
}

impl FakeDag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, id: &str, state: NodeState, job_id: Option<&str>, deps: &[&str]) -> Self {
        self.nodes.push(FakeNode {
            id: id.to_string(),
            state,
            pure_publishing: false,
            job_id: job_id.map(str::to_string),
            deps: deps.iter().map(|d| d.to_string()).collect(),
        });
        self
    }

    pub fn with_publishing_node(mut self, id: &str, state: NodeState, deps: &[&str]) -> Self {
        self.nodes.push(FakeNode {
            id: id.to_string(),
            state,
            pure_publishing: true,
            job_id: None,
            deps: deps.iter().map(|d| d.to_string()).collect(),
        });
        self
    }

    pub fn set_state(&mut self, id: &str, state: NodeState) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.state = state;
        }
    }

    pub fn set_job_id(&mut self, id: &str, job_id: &str) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.job_id = Some(job_id.to_string());
        }
    }
}

impl DagView for FakeDag {
    fn topological_order(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    fn node(&self, id: &str) -> Option<NodeView<'_>> {
        self.nodes.iter().find(|n| n.id == id).map(|n| NodeView {
            id: n.id.as_str(),
            name: n.id.as_str(),
            state: n.state,
            pure_publishing: n.pure_publishing,
            job_id: n.job_id.as_deref(),
        })
    }

    fn dependencies_of(&self, id: &str) -> Vec<String> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.deps.clone())
            .unwrap_or_default()
    }

    fn edges(&self) -> Vec<(String, String)> {
        self.nodes
            .iter()
            .flat_map(|n| n.deps.iter().map(move |d| (d.clone(), n.id.clone())))
            .collect()
    }
}
