// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Adapter configuration as read from a TOML file.
///
/// ```toml
/// [job_controller]
/// url = "http://job-controller:5000"
///
/// [status_bus]
/// url = "http://server:80/workflows/status"
///
/// [workspace]
/// shared_volume_path = "/var/reana"
/// mount_cvmfs = "false"
///
/// [engine]
/// poll_interval_ms = 5000
/// ```
///
/// All sections are optional and have reasonable defaults. This is the raw,
/// unvalidated form; use [`AdapterConfig`] in the rest of the crate.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAdapterConfig {
    #[serde(default)]
    pub job_controller: JobControllerSection,

    #[serde(default)]
    pub status_bus: StatusBusSection,

    #[serde(default)]
    pub workspace: WorkspaceSection,

    #[serde(default)]
    pub engine: EngineSection,
}

/// Validated adapter configuration.
///
/// Only constructible through `TryFrom<RawAdapterConfig>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub job_controller: JobControllerSection,
    pub status_bus: StatusBusSection,
    pub workspace: WorkspaceSection,
    pub engine: EngineSection,
}

impl AdapterConfig {
    pub(crate) fn new_unchecked(raw: RawAdapterConfig) -> Self {
        Self {
            job_controller: raw.job_controller,
            status_bus: raw.status_bus,
            workspace: raw.workspace,
            engine: raw.engine,
        }
    }
}

/// `[job_controller]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobControllerSection {
    /// Base URL of the remote job controller API.
    #[serde(default = "default_job_controller_url")]
    pub url: String,
}

fn default_job_controller_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for JobControllerSection {
    fn default() -> Self {
        Self {
            url: default_job_controller_url(),
        }
    }
}

/// `[status_bus]` section.
///
/// When `url` is absent, status messages are only written to the log.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusBusSection {
    #[serde(default)]
    pub url: Option<String>,
}

/// `[workspace]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceSection {
    /// Root under which every workflow workspace lives.
    #[serde(default = "default_shared_volume_path")]
    pub shared_volume_path: String,

    /// Passed through to the job controller as `cvmfs_mounts`.
    #[serde(default = "default_mount_cvmfs")]
    pub mount_cvmfs: String,
}

fn default_shared_volume_path() -> String {
    "/var/reana".to_string()
}

fn default_mount_cvmfs() -> String {
    "false".to_string()
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            shared_volume_path: default_shared_volume_path(),
            mount_cvmfs: default_mount_cvmfs(),
        }
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Delay between two scheduling ticks of the driver.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    5000
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl EngineSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
