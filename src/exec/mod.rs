// src/exec/mod.rs

//! Remote execution layer.
//!
//! - [`encoder`] turns a built job into the shell string that runs remotely.
//! - [`resources`] merges loosely-typed resource hints into a typed record.
//! - [`client`] is the request/response boundary to the job controller.
//! - [`cache`] is the monotonic job-status cache.
//! - [`handle`] is the engine-facing handle for a submitted job.
//! - [`backend`] ties these together into the capability set the DAG
//!   engine drives.

pub mod backend;
pub mod cache;
pub mod client;
pub mod encoder;
pub mod handle;
pub mod resources;

pub use backend::{BackendConfig, ExternalBackend};
pub use cache::JobStatusCache;
pub use client::{HttpJobController, JobController, JobSubmission, RemoteError, RemoteFuture};
pub use encoder::{EncodedCommand, encode_command};
pub use handle::JobHandle;
pub use resources::ResourceHints;
