//! Domain layer: pure business logic (no I/O beyond the `log` facade).

pub mod checkin;
pub mod job;
pub mod ledger;
pub mod metadata;
pub mod nft;
pub mod stats;

pub use checkin::{classify_wallet, CheckIn, CheckInWire, EventDetails, WalletCheck};
pub use job::{derive_job_id, JobError, JobErrorKind, MintJob, MintStatus, SkipReason, StateTransitionResult};
pub use ledger::{
    inspect_finalized_events, BlockRef, CostEstimate, FinalityOutcome, FinalityVerdict, LedgerEvent, Milestone, MintCall,
    SignedTransaction, TxStatusUpdate, UnsignedTransaction,
};
pub use metadata::{MetadataAttribute, MetadataProperties, MetadataTemplate, MintMetadata};
pub use nft::NftRecord;
pub use stats::{ErrorStats, EventMintSummary, FailureEntry, QueueStats};
