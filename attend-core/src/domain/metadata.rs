//! Token metadata snapshot.
//!
//! Built once from the check-in that creates a job and stored on the job, so every
//! resubmission carries byte-identical metadata.

use crate::domain::checkin::CheckIn;
use crate::foundation::util::time::format_rfc3339;
use crate::foundation::PipelineError;
use serde::{Deserialize, Serialize};

pub const METADATA_CATEGORY: &str = "attendance";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetadataAttribute {
    pub trait_type: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetadataProperties {
    pub category: String,
    pub event_id: String,
    pub checkin_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MintMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<MetadataAttribute>,
    pub properties: MetadataProperties,
}

/// Deployment-level inputs to metadata (from config).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataTemplate {
    pub image_url: String,
    pub default_location: String,
}

impl MintMetadata {
    pub fn from_check_in(check_in: &CheckIn, template: &MetadataTemplate) -> Self {
        let event_name = check_in.event.name.clone().unwrap_or_else(|| check_in.event_id.to_string());
        let event_date = check_in.event.date.clone().unwrap_or_else(|| format_rfc3339(check_in.occurred_at_nanos));
        let location = check_in.event.location.clone().unwrap_or_else(|| template.default_location.clone());
        let attribute = |trait_type: &str, value: String| MetadataAttribute { trait_type: trait_type.to_string(), value };

        Self {
            name: format!("{} - Attendance NFT", event_name),
            description: format!("This NFT certifies attendance at {}", event_name),
            image: template.image_url.clone(),
            attributes: vec![
                attribute("Event Name", event_name),
                attribute("Event Date", event_date),
                attribute("Attendee Name", check_in.attendee_name.clone()),
                attribute("Check-in Time", format_rfc3339(check_in.occurred_at_nanos)),
                attribute("Location", location),
            ],
            properties: MetadataProperties {
                category: METADATA_CATEGORY.to_string(),
                event_id: check_in.event_id.to_string(),
                checkin_id: check_in.check_in_id.to_string(),
            },
        }
    }

    /// JSON string passed to the mint call; field order is fixed by the struct layout.
    pub fn to_call_json(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string(self)?)
    }
}
