// src/step/mod.rs

//! Step descriptions and the local half of running a step.
//!
//! - [`model`] is the serde model of a step (process, environment, publisher).
//! - [`state`] holds the step's workspace directories and resolves
//!   `{workdir}` in parameters.
//! - [`template`] interpolates command / script templates.
//! - [`publisher`] turns parameters into the step's declared outputs.

pub mod model;
pub mod publisher;
pub mod state;
pub mod template;

pub use model::{EnvironmentSpec, ProcessSpec, StepMetadata, StepSpec};
pub use publisher::{PublisherSpec, publish};
pub use state::{StepState, contextualize_parameters};
pub use template::{BuiltJob, build_job, interpolate};
