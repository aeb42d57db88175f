use crate::foundation::{BlockHash, EventId, PipelineError, TxHash, WalletAddress};
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlockRef {
    pub hash: BlockHash,
    pub number: u64,
}

/// Contract call `mint_nft(event_id, recipient, metadata)`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MintCall {
    pub contract: String,
    pub event_id: EventId,
    pub recipient: WalletAddress,
    pub metadata_json: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CostEstimate {
    pub gas_limit: u64,
    pub proof_size: u64,
    pub fee: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UnsignedTransaction {
    pub call: MintCall,
    pub cost: CostEstimate,
    pub signer: WalletAddress,
}

impl UnsignedTransaction {
    /// Canonical bytes handed to the signer.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, PipelineError> {
        Ok(bincode::DefaultOptions::new().with_fixint_encoding().serialize(self)?)
    }

    pub fn from_signing_bytes(bytes: &[u8]) -> Result<Self, PipelineError> {
        Ok(bincode::DefaultOptions::new().with_fixint_encoding().deserialize(bytes)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SignedTransaction {
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
    pub signer: WalletAddress,
}

impl SignedTransaction {
    /// Hash a ledger would report for this extrinsic; used by local ledgers.
    pub fn hash(&self) -> TxHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.payload);
        hasher.update(&self.signature);
        TxHash::from(*hasher.finalize().as_bytes())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LedgerEvent {
    pub module: String,
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl LedgerEvent {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self { module: module.into(), name: name.into(), fields: BTreeMap::new() }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Status milestones, in the order a healthy transaction reaches them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Milestone {
    Pool,
    InBlock,
    Finalized,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TxStatusUpdate {
    Pool,
    InBlock { block: BlockRef },
    Finalized { block: BlockRef, events: Vec<LedgerEvent> },
}

impl TxStatusUpdate {
    pub fn milestone(&self) -> Milestone {
        match self {
            TxStatusUpdate::Pool => Milestone::Pool,
            TxStatusUpdate::InBlock { .. } => Milestone::InBlock,
            TxStatusUpdate::Finalized { .. } => Milestone::Finalized,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinalityVerdict {
    Success { token_id: u64 },
    Reverted { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinalityOutcome {
    Finalized { block: BlockRef, verdict: FinalityVerdict },
    TimedOut { last_milestone: Option<Milestone> },
}
