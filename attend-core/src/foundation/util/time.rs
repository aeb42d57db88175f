use crate::foundation::PipelineError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn current_timestamp_nanos_env(env_var: Option<&str>) -> Result<u64, PipelineError> {
    if let Some(var) = env_var {
        if let Ok(value) = std::env::var(var) {
            return value.parse::<u64>().map_err(|err| PipelineError::Message(err.to_string()));
        }
    }
    let now = SystemTime::now().duration_since(UNIX_EPOCH).map_err(|err| PipelineError::Message(err.to_string()))?;
    Ok(now.as_secs().saturating_mul(1_000_000_000).saturating_add(u64::from(now.subsec_nanos())))
}

/// Returns the current wall-clock timestamp in nanoseconds.
///
/// For test determinism, this respects `TEST_NOW_NANOS_ENV_VAR` when set.
pub fn now_nanos() -> u64 {
    current_timestamp_nanos_env(Some(crate::foundation::constants::TEST_NOW_NANOS_ENV_VAR))
        .or_else(|_| current_timestamp_nanos_env(None))
        .unwrap_or(0)
}

/// Parses an ISO8601/RFC 3339 timestamp with any offset into UTC nanoseconds.
pub fn parse_rfc3339_nanos(value: &str) -> Result<u64, PipelineError> {
    let parsed = DateTime::parse_from_rfc3339(value.trim())
        .map_err(|err| PipelineError::ParseError(format!("invalid ISO8601 timestamp {:?}: {}", value, err)))?;
    let nanos = parsed
        .with_timezone(&Utc)
        .timestamp_nanos_opt()
        .ok_or_else(|| PipelineError::ParseError(format!("timestamp out of range: {}", value)))?;
    u64::try_from(nanos).map_err(|_| PipelineError::ParseError(format!("timestamp before epoch: {}", value)))
}

pub fn format_rfc3339(timestamp_nanos: u64) -> String {
    let nanos = i64::try_from(timestamp_nanos).unwrap_or(i64::MAX);
    DateTime::<Utc>::from_timestamp_nanos(nanos).to_rfc3339_opts(SecondsFormat::Secs, true)
}
