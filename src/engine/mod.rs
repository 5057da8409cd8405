// src/engine/mod.rs

//! Workflow driver.
//!
//! [`WorkflowRun`] walks a [`crate::dag::StepGraph`] tick by tick: it polls
//! running stages through the [`crate::exec::ExternalBackend`], submits the
//! stages whose dependencies succeeded and hands the DAG to the
//! [`crate::progress::ProgressTracker`] after every tick.

use std::time::Duration;

use crate::config::AdapterConfig;

pub mod run;

pub use run::WorkflowRun;

/// Knobs of the driver loop.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Delay between two ticks.
    pub poll_interval: Duration,
}

impl RunOptions {
    pub fn from_config(cfg: &AdapterConfig) -> Self {
        Self {
            poll_interval: cfg.engine.poll_interval(),
        }
    }
}

/// Terminal state of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Finished,
    Failed,
}
