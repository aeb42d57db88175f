#![allow(dead_code)]

use crate::fixtures::{ALICE_WALLET, TEST_EVENT_ID};
use attend_core::domain::CheckInWire;

pub struct CheckInBuilder {
    check_in_id: String,
    event_id: String,
    wallet_address: Option<String>,
    attendee_name: String,
    occurred_at: String,
    event_name: Option<String>,
}

impl Default for CheckInBuilder {
    fn default() -> Self {
        Self {
            check_in_id: "c1".to_string(),
            event_id: TEST_EVENT_ID.to_string(),
            wallet_address: Some(ALICE_WALLET.to_string()),
            attendee_name: "Alice".to_string(),
            occurred_at: "2024-03-15T10:30:00Z".to_string(),
            event_name: Some("RustConf".to_string()),
        }
    }
}

impl CheckInBuilder {
    pub fn check_in_id(mut self, check_in_id: impl Into<String>) -> Self {
        self.check_in_id = check_in_id.into();
        self
    }

    pub fn event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = event_id.into();
        self
    }

    pub fn wallet(mut self, wallet: Option<&str>) -> Self {
        self.wallet_address = wallet.map(str::to_string);
        self
    }

    pub fn attendee(mut self, name: impl Into<String>) -> Self {
        self.attendee_name = name.into();
        self
    }

    pub fn build(self) -> CheckInWire {
        CheckInWire {
            check_in_id: self.check_in_id,
            event_id: self.event_id,
            wallet_address: self.wallet_address,
            attendee_name: self.attendee_name,
            occurred_at: self.occurred_at,
            event_name: self.event_name,
            event_date: None,
            location: None,
        }
    }
}
