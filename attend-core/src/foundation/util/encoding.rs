use crate::foundation::{Hash32, PipelineError};

pub fn decode_hex(s: &str) -> Result<Vec<u8>, PipelineError> {
    let trimmed = s.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(stripped).map_err(|e| e.into())
}

pub fn parse_hex_32bytes(s: &str) -> Result<Hash32, PipelineError> {
    let bytes = decode_hex(s)?;
    bytes.as_slice().try_into().map_err(|_| PipelineError::EncodingError(format!("expected 32 bytes, got {}", bytes.len())))
}
