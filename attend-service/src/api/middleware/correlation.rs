//! Per-request correlation id, echoed back in `x-request-id`.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use log::debug;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Reuses the caller's id when it is short printable ASCII, otherwise mints a fresh one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(REQUEST_ID_HEADER).map(HeaderValue::as_bytes) {
            Some(raw) if is_acceptable_request_id(raw) => Self(String::from_utf8_lossy(raw).into_owned()),
            Some(raw) => {
                debug!("ignoring unusable x-request-id len={}", raw.len());
                Self::generate()
            }
            None => Self::generate(),
        }
    }

    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

fn is_acceptable_request_id(raw: &[u8]) -> bool {
    !raw.is_empty() && raw.len() <= MAX_REQUEST_ID_LEN && raw.iter().all(u8::is_ascii_graphic)
}

pub async fn correlation_middleware(mut req: Request<Body>, next: Next) -> Response {
    let correlation_id = CorrelationId::from_headers(req.headers());
    let echoed = HeaderValue::from_str(&correlation_id.0).ok();
    req.extensions_mut().insert(correlation_id);

    let mut response = next.run(req).await;
    if let Some(value) = echoed {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
