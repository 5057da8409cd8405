// src/config/mod.rs

//! Adapter configuration.
//!
//! - `model.rs`: TOML-backed data model.
//! - `loader.rs`: reading from disk + environment overrides.
//! - `validate.rs`: `RawAdapterConfig` -> `AdapterConfig`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{apply_overrides, default_config_path, load_and_validate, load_from_path};
pub use model::{
    AdapterConfig, EngineSection, JobControllerSection, RawAdapterConfig, StatusBusSection,
    WorkspaceSection,
};
