use attend_core::foundation::{ErrorCode, JobId, PipelineError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::warn;

/// JSON error body: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: String,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { status, code: code.into(), message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidCheckIn | ErrorCode::InvalidWalletAddress | ErrorCode::ParseError | ErrorCode::EncodingError => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::JobNotFound => StatusCode::NOT_FOUND,
        ErrorCode::JobBusy | ErrorCode::OperatorActionRejected | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorCode::StorageLockTimeout => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let code = err.code();
        Self::new(status_for(code), format!("{:?}", code), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!("api error status={} code={} message={}", self.status.as_u16(), self.code, self.message);
        }
        let body = serde_json::json!({ "error": { "code": self.code, "message": self.message } });
        (self.status, Json(body)).into_response()
    }
}

pub fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    raw.parse::<JobId>().map_err(|err| ApiError::bad_request(format!("invalid job id {:?}: {}", raw, err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_http_status() {
        assert_eq!(ApiError::from(PipelineError::job_not_found("x")).status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(PipelineError::JobBusy { job_id: "x".to_string() }).status, StatusCode::CONFLICT);
        assert_eq!(ApiError::from(PipelineError::InvalidCheckIn("eventId".to_string())).status, StatusCode::BAD_REQUEST);
        let storage = ApiError::from(PipelineError::StorageError { operation: "get".to_string(), details: "io".to_string() });
        assert_eq!(storage.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.code, "StorageError");
    }

    #[test]
    fn job_id_accepts_prefixed_hex_only_of_full_length() {
        assert!(parse_job_id(&format!("0x{}", "ab".repeat(32))).is_ok());
        assert!(parse_job_id("0xabcd").is_err());
    }
}
