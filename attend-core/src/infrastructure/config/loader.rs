//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Profile overrides from `[profiles.<name>]`
//! 4. Environment variables (ATTEND_* prefix)

use crate::foundation::PipelineError;
use crate::infrastructure::config::types::AppConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::Dict;
use figment::{Figment, Profile};
use log::{debug, info};
use std::path::Path;

/// Environment variable prefix for config overrides.
///
/// Example: `ATTEND_PIPELINE__MAX_ATTEMPTS` -> `pipeline.max_attempts`
const ENV_PREFIX: &str = "ATTEND_";

/// Keys under the prefix that are not config (paths, profile selector, secrets, test clock).
const ENV_IGNORED: &[&str] = &["config_path", "data_dir", "profile", "test_now_nanos"];

pub fn load_config_from_file(path: &Path, data_dir: &Path) -> Result<AppConfig, PipelineError> {
    info!("loading configuration path={} data_dir={}", path.display(), data_dir.display());
    let figment = figment_base(path).merge(env_provider());
    let mut config: AppConfig = figment.extract().map_err(|e| PipelineError::ConfigError(format!("config extraction failed: {e}")))?;
    postprocess(&mut config, data_dir);
    debug!("configuration loaded gateway_url={} listen_addr={}", redact_url(&config.ledger.gateway_url), config.api.listen_addr);
    Ok(config)
}

pub fn load_config_from_file_with_profile(path: &Path, data_dir: &Path, profile: &str) -> Result<AppConfig, PipelineError> {
    info!("loading configuration with profile path={} data_dir={} profile={}", path.display(), data_dir.display(), profile);

    // Extract once to access `profiles.<name>` overrides from the file.
    let base: AppConfig =
        figment_base(path).extract().map_err(|e| PipelineError::ConfigError(format!("config extraction failed: {e}")))?;
    let overrides = profile_overrides(&base, profile)?;

    let figment = figment_base(path).merge(Serialized::from(overrides, Profile::Default)).merge(env_provider());
    let mut config: AppConfig = figment
        .extract()
        .map_err(|e| PipelineError::ConfigError(format!("config extraction failed for profile '{profile}': {e}")))?;
    postprocess(&mut config, data_dir);
    debug!("configuration loaded with profile profile={} gateway_url={}", profile, redact_url(&config.ledger.gateway_url));
    Ok(config)
}

fn figment_base(path: &Path) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("configuration file missing; using defaults and env only path={}", path.display());
    }
    figment
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).ignore(ENV_IGNORED).filter(|key| !key.as_str().to_ascii_lowercase().starts_with("secret")).split("__")
}

fn profile_overrides(config: &AppConfig, profile: &str) -> Result<Dict, PipelineError> {
    let profiles = config.profiles.as_ref().ok_or_else(|| PipelineError::ConfigError("no profiles section in config".to_string()))?;
    profiles.get(profile).cloned().ok_or_else(|| PipelineError::ConfigError(format!("profile '{profile}' not found in config")))
}

fn postprocess(config: &mut AppConfig, data_dir: &Path) {
    if config.service.data_dir.trim().is_empty() {
        config.service.data_dir = data_dir.to_string_lossy().to_string();
    }
    if config.service.log_filters.trim().is_empty() {
        config.service.log_filters = "info".to_string();
    }
    config.ledger.gateway_url = config.ledger.gateway_url.trim().trim_end_matches('/').to_string();
    config.signer.organizer_wallet = config.signer.organizer_wallet.trim().to_string();
    if let Some(token) = config.api.operator_token.as_ref() {
        if token.trim().is_empty() {
            config.api.operator_token = None;
        }
    }
}

pub(crate) fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let (scheme, rest) = url.split_at(scheme_end + 3);
    let Some(at) = rest.find('@') else {
        return url.to_string();
    };
    format!("{scheme}<redacted>@{}", &rest[at + 1..])
}
