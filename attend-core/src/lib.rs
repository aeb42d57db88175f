// Public crate surface is organized by layer: foundation primitives, pure domain logic,
// infrastructure adapters (config, logging, storage, ledger, signer) and application wiring.
pub mod application;
pub mod domain;
pub mod foundation;
pub mod infrastructure;

pub use foundation::{PipelineError, Result};
