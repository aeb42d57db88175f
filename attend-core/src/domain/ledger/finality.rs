use super::types::{FinalityVerdict, LedgerEvent};

pub const SYSTEM_MODULE: &str = "System";
pub const EXTRINSIC_FAILED_EVENT: &str = "ExtrinsicFailed";
pub const CONTRACT_MINTED_EVENT: &str = "NFTMinted";

/// Classifies a finalized transaction from its block events.
///
/// `System.ExtrinsicFailed` means the dispatch reverted. A successful dispatch without the
/// contract's `NFTMinted` event means `mint_nft` returned false, which is also a revert.
pub fn inspect_finalized_events(events: &[LedgerEvent]) -> FinalityVerdict {
    if let Some(failed) = events.iter().find(|e| e.module == SYSTEM_MODULE && e.name == EXTRINSIC_FAILED_EVENT) {
        let reason = failed.fields.get("dispatch_error").cloned().unwrap_or_else(|| EXTRINSIC_FAILED_EVENT.to_string());
        return FinalityVerdict::Reverted { reason };
    }
    let minted = events.iter().find(|e| e.name == CONTRACT_MINTED_EVENT);
    match minted.and_then(|e| e.fields.get("nft_id")) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(token_id) => FinalityVerdict::Success { token_id },
            Err(_) => FinalityVerdict::Reverted { reason: format!("unparseable nft_id in {}: {}", CONTRACT_MINTED_EVENT, raw) },
        },
        None if minted.is_some() => FinalityVerdict::Reverted { reason: format!("{} without nft_id", CONTRACT_MINTED_EVENT) },
        None => FinalityVerdict::Reverted { reason: format!("finalized without {} event", CONTRACT_MINTED_EVENT) },
    }
}
