// src/dag/mod.rs

//! DAG representation.
//!
//! - [`view`] is the read-only interface the progress summarizer consumes.
//! - [`workflow`] is the workflow document model and its validation.
//! - [`graph`] holds the in-memory DAG of stages with their run state.

pub mod graph;
pub mod view;
pub mod workflow;

pub use graph::{StepGraph, StepNode};
pub use view::{DagView, NodeState, NodeView};
pub use workflow::{StageSpec, WorkflowSpec, decode_parameters};
