use crate::domain::ledger::BlockRef;
use crate::domain::metadata::MintMetadata;
use crate::foundation::{EventId, JobId, TxHash, WalletAddress};
use serde::{Deserialize, Serialize};

/// Ledger-confirmed token; written once, together with the COMPLETED job.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NftRecord {
    pub contract_token_id: u64,
    pub job_id: JobId,
    pub event_id: EventId,
    pub owner_wallet: WalletAddress,
    pub metadata_snapshot: MintMetadata,
    pub transaction_hash: TxHash,
    pub minted_at_block: BlockRef,
    pub recorded_at_nanos: u64,
}
