mod loader;
mod types;
pub mod validation;

pub use loader::{load_config_from_file, load_config_from_file_with_profile};
pub use types::*;

use crate::foundation::PipelineError;
use log::info;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "ATTEND_CONFIG_PATH";
pub const DATA_DIR_ENV: &str = "ATTEND_DATA_DIR";
pub const PROFILE_ENV: &str = "ATTEND_PROFILE";
pub const DEFAULT_CONFIG_FILE_NAME: &str = "attend-config.toml";
/// Env overrides the service CLI writes for `--ledger` and `--listen`.
pub const LEDGER_MODE_ENV: &str = "ATTEND_LEDGER__MODE";
pub const LISTEN_ADDR_ENV: &str = "ATTEND_API__LISTEN_ADDR";

pub fn resolve_config_path(data_dir: &Path) -> Result<PathBuf, PipelineError> {
    if let Some(value) = non_empty_env(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(value));
    }
    Ok(data_dir.join(DEFAULT_CONFIG_FILE_NAME))
}

pub fn resolve_data_dir() -> Result<PathBuf, PipelineError> {
    if let Some(value) = non_empty_env(DATA_DIR_ENV) {
        return Ok(PathBuf::from(value));
    }
    let cwd = std::env::current_dir()
        .map_err(|err| PipelineError::StorageError { operation: "env::current_dir".to_string(), details: err.to_string() })?;
    Ok(cwd.join(".attend"))
}

/// Resolves data dir, config path and profile from the environment, loads and validates.
pub fn load_app_config() -> Result<AppConfig, PipelineError> {
    let data_dir = resolve_data_dir()?;
    let config_path = resolve_config_path(&data_dir)?;
    let config = match non_empty_env(PROFILE_ENV) {
        Some(profile) => load_config_from_file_with_profile(&config_path, &data_dir, &profile)?,
        None => load_config_from_file(&config_path, &data_dir)?,
    };
    config.validate().map_err(|errors| PipelineError::ConfigError(format!("validation failed: {:?}", errors)))?;
    info!(
        "configuration ready data_dir={} ledger_mode={} max_attempts={} confirmation_timeout_secs={}",
        config.service.data_dir, config.ledger.mode, config.pipeline.max_attempts, config.pipeline.confirmation_timeout_secs
    );
    Ok(config)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}
