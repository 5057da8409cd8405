// src/progress/mod.rs

//! Workflow progress reporting.
//!
//! - [`summarizer`] classifies DAG nodes and builds a [`ProgressSnapshot`].
//! - [`tracker`] keeps the last snapshot and publishes only on change.
//! - [`publisher`] is the status bus abstraction and its implementations.

pub mod publisher;
pub mod snapshot;
pub mod summarizer;
pub mod tracker;

pub use publisher::{
    ChannelStatusPublisher, HttpStatusPublisher, LogStatusPublisher, PublishFuture,
    StatusMessage, StatusPublisher,
};
pub use snapshot::{ProgressBucket, ProgressSnapshot};
pub use summarizer::{ClassifiedNode, NodeClass, classify_nodes, render_dag, summarize};
pub use tracker::ProgressTracker;
