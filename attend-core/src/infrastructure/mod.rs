//! Infrastructure layer: adapters for config, logging, persistence, the ledger and signing.

pub mod config;
pub mod ledger;
pub mod logging;
pub mod signer;
pub mod storage;
