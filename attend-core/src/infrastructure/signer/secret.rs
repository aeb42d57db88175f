//! Environment variable based secret store.

use crate::foundation::PipelineError;
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretVec};
use std::collections::HashMap;

/// `ATTEND_SECRET__SIGNER__SEED` is looked up as `signer.seed`.
pub const SECRET_ENV_PREFIX: &str = "ATTEND_SECRET__";

/// Secret bytes that never show up in `Debug` output.
pub struct SecretBytes {
    inner: SecretVec<u8>,
}

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { inner: SecretVec::new(bytes) }
    }

    pub fn expose_secret(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for SecretBytes {
    fn clone(&self) -> Self {
        Self::new(self.expose_secret().to_vec())
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED {} bytes])", self.len())
    }
}

pub struct EnvSecretStore {
    cache: HashMap<String, SecretBytes>,
}

impl Default for EnvSecretStore {
    fn default() -> Self {
        Self::from_vars(std::env::vars())
    }
}

impl EnvSecretStore {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut cache = HashMap::new();
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(SECRET_ENV_PREFIX).and_then(parse_env_name) else {
                continue;
            };
            match decode_value(&name, &value) {
                Ok(bytes) => {
                    debug!("loaded secret from env name={}", name);
                    cache.insert(name, bytes);
                }
                Err(err) => warn!("failed to decode env secret name={} error={}", name, err),
            }
        }
        info!("env secret store loaded count={}", cache.len());
        Self { cache }
    }

    pub fn get(&self, name: &str) -> Result<SecretBytes, PipelineError> {
        self.cache
            .get(name)
            .cloned()
            .ok_or_else(|| PipelineError::SecretNotFound { name: name.to_string(), backend: "env".to_string() })
    }
}

fn parse_env_name(raw: &str) -> Option<String> {
    let parts: Vec<String> = raw.split("__").map(str::trim).filter(|s| !s.is_empty()).map(str::to_ascii_lowercase).collect();
    if parts.len() < 2 {
        return None;
    }
    Some(parts.join("."))
}

/// `hex:` prefixed values are hex-decoded, anything else is taken as raw bytes.
fn decode_value(name: &str, value: &str) -> Result<SecretBytes, PipelineError> {
    match value.trim().strip_prefix("hex:") {
        Some(hex_data) => hex::decode(hex_data.trim_start_matches("0x")).map(SecretBytes::new).map_err(|err| {
            PipelineError::SecretDecodeFailed { name: name.to_string(), encoding: "hex".to_string(), details: err.to_string() }
        }),
        None => Ok(SecretBytes::new(value.trim().as_bytes().to_vec())),
    }
}
