use crate::foundation::Hash32;

/// Helper to build storage keys consistently.
pub struct KeyBuilder {
    buf: Vec<u8>,
}

impl KeyBuilder {
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    pub fn hash32(mut self, hash: &Hash32) -> Self {
        self.buf.extend_from_slice(hash);
        self
    }

    /// Length-prefixed string, so that one id can never be a prefix of another.
    pub fn str_lp(mut self, value: &str) -> Self {
        self.buf.extend_from_slice(&(value.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn str(mut self, value: &str) -> Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

pub const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

pub const CF_DEFAULT: &str = "default";
pub const CF_METADATA: &str = "metadata";
/// `check_in_id -> CheckIn`
pub const CF_CHECKIN: &str = "checkin";
/// `lp(event_id) ++ check_in_id -> ()`
pub const CF_CHECKIN_BY_EVENT: &str = "checkin_by_event";
/// `job_id -> MintJob`
pub const CF_JOB: &str = "job";
/// `lp(event_id) ++ job_id -> ()`
pub const CF_JOB_BY_EVENT: &str = "job_by_event";
/// `job_id -> ()` for every job that is not terminal
pub const CF_JOB_ACTIVE: &str = "job_active";
/// `job_id -> NftRecord`
pub const CF_NFT: &str = "nft";

pub const ALL_CFS: &[&str] = &[CF_DEFAULT, CF_METADATA, CF_CHECKIN, CF_CHECKIN_BY_EVENT, CF_JOB, CF_JOB_BY_EVENT, CF_JOB_ACTIVE, CF_NFT];
