// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{AdapterConfig, RawAdapterConfig};
use crate::errors::Result;

/// Environment variables that override values from the TOML file.
pub const ENV_JOB_CONTROLLER_URL: &str = "DAGREMOTE_JOB_CONTROLLER_URL";
pub const ENV_STATUS_BUS_URL: &str = "DAGREMOTE_STATUS_BUS_URL";
pub const ENV_SHARED_VOLUME_PATH: &str = "DAGREMOTE_SHARED_VOLUME_PATH";
pub const ENV_MOUNT_CVMFS: &str = "DAGREMOTE_MOUNT_CVMFS";

/// Load a configuration file from a given path and return the raw `RawAdapterConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawAdapterConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawAdapterConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, apply environment overrides and validate.
///
/// A missing file at the default location is not an error: the defaults
/// (plus any environment overrides) are used instead.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<AdapterConfig> {
    let path = path.as_ref();

    let mut raw = if !path.exists() && path == default_config_path().as_path() {
        info!(?path, "no config file found; using defaults");
        RawAdapterConfig::default()
    } else {
        load_from_path(path)?
    };

    apply_overrides(&mut raw, |key| std::env::var(key).ok());

    AdapterConfig::try_from(raw)
}

/// Apply overrides looked up through `lookup` (the environment in production).
pub fn apply_overrides<F>(raw: &mut RawAdapterConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_JOB_CONTROLLER_URL) {
        debug!(%url, "job controller url overridden from environment");
        raw.job_controller.url = url;
    }
    if let Some(url) = lookup(ENV_STATUS_BUS_URL) {
        debug!(%url, "status bus url overridden from environment");
        raw.status_bus.url = Some(url);
    }
    if let Some(path) = lookup(ENV_SHARED_VOLUME_PATH) {
        raw.workspace.shared_volume_path = path;
    }
    if let Some(mount) = lookup(ENV_MOUNT_CVMFS) {
        raw.workspace.mount_cvmfs = mount;
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("dagremote.toml")
}
