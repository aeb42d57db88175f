use crate::foundation::util::time::parse_rfc3339_nanos;
use crate::foundation::{CheckInId, EventId, PipelineError, MAX_IDENTIFIER_LENGTH, MAX_METADATA_FIELD_LENGTH};
use serde::{Deserialize, Serialize};

/// Check-in notification as delivered by the scheduling provider.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInWire {
    pub check_in_id: String,
    pub event_id: String,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub attendee_name: String,
    pub occurred_at: String,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventDetails {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
}

/// Immutable check-in fact, retained for audit.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckIn {
    pub check_in_id: CheckInId,
    pub event_id: EventId,
    /// Raw wallet as delivered; may be absent or malformed.
    pub wallet_address: Option<String>,
    pub attendee_name: String,
    pub occurred_at_nanos: u64,
    pub event: EventDetails,
    pub received_at_nanos: u64,
}

impl CheckIn {
    pub fn from_wire(wire: CheckInWire, received_at_nanos: u64) -> Result<Self, PipelineError> {
        let check_in_id = required_identifier("checkInId", &wire.check_in_id)?;
        let event_id = required_identifier("eventId", &wire.event_id)?;
        let occurred_at_nanos = parse_rfc3339_nanos(&wire.occurred_at)
            .map_err(|err| PipelineError::InvalidCheckIn(format!("occurredAt: {}", err)))?;
        Ok(Self {
            check_in_id: CheckInId::new(check_in_id),
            event_id: EventId::new(event_id),
            wallet_address: wire.wallet_address,
            attendee_name: clip(wire.attendee_name.trim()),
            occurred_at_nanos,
            event: EventDetails {
                name: optional_field(wire.event_name),
                date: optional_field(wire.event_date),
                location: optional_field(wire.location),
            },
            received_at_nanos,
        })
    }
}

fn required_identifier(field: &str, value: &str) -> Result<String, PipelineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidCheckIn(format!("{} is required", field)));
    }
    if trimmed.len() > MAX_IDENTIFIER_LENGTH {
        return Err(PipelineError::InvalidCheckIn(format!("{} exceeds {} bytes", field, MAX_IDENTIFIER_LENGTH)));
    }
    Ok(trimmed.to_string())
}

fn optional_field(value: Option<String>) -> Option<String> {
    value.map(|v| clip(v.trim())).filter(|v| !v.is_empty())
}

fn clip(value: &str) -> String {
    if value.len() <= MAX_METADATA_FIELD_LENGTH {
        return value.to_string();
    }
    let mut end = MAX_METADATA_FIELD_LENGTH;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}
