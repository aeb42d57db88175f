mod finality;
mod types;

pub use finality::{inspect_finalized_events, CONTRACT_MINTED_EVENT, EXTRINSIC_FAILED_EVENT, SYSTEM_MODULE};
pub use types::{
    BlockRef, CostEstimate, FinalityOutcome, FinalityVerdict, LedgerEvent, Milestone, MintCall, SignedTransaction, TxStatusUpdate,
    UnsignedTransaction,
};
