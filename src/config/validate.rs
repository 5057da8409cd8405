// src/config/validate.rs

use crate::config::model::{AdapterConfig, RawAdapterConfig};
use crate::errors::{DagremoteError, Result};

impl TryFrom<RawAdapterConfig> for AdapterConfig {
    type Error = DagremoteError;

    fn try_from(raw: RawAdapterConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(AdapterConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawAdapterConfig) -> Result<()> {
    validate_url("[job_controller].url", &cfg.job_controller.url)?;
    if let Some(url) = &cfg.status_bus.url {
        validate_url("[status_bus].url", url)?;
    }
    validate_workspace(cfg)?;
    validate_engine(cfg)?;
    Ok(())
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DagremoteError::ConfigError(format!(
            "{field} must not be empty"
        )));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(DagremoteError::ConfigError(format!(
            "{field} must start with http:// or https:// (got '{url}')"
        )));
    }
    Ok(())
}

fn validate_workspace(cfg: &RawAdapterConfig) -> Result<()> {
    if cfg.workspace.shared_volume_path.trim().is_empty() {
        return Err(DagremoteError::ConfigError(
            "[workspace].shared_volume_path must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_engine(cfg: &RawAdapterConfig) -> Result<()> {
    if cfg.engine.poll_interval_ms == 0 {
        return Err(DagremoteError::ConfigError(
            "[engine].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
