//! Wallet address heuristic.
//!
//! Length and prefix only; no checksum or key decoding. Accepted shapes:
//! - SS58-style base58 strings of 46..=48 characters
//! - `0x` followed by 64 hex characters (raw 32-byte account id)

use crate::foundation::WalletAddress;

const SS58_MIN_LEN: usize = 46;
const SS58_MAX_LEN: usize = 48;
const HEX_ACCOUNT_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletCheck {
    Valid(WalletAddress),
    Missing,
    Malformed(String),
}

impl WalletCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, WalletCheck::Valid(_))
    }

    /// Form used for job id derivation: normalized when valid, trimmed raw input otherwise.
    pub fn key_form(&self) -> &str {
        match self {
            WalletCheck::Valid(address) => address.as_str(),
            WalletCheck::Missing => "",
            WalletCheck::Malformed(raw) => raw.as_str(),
        }
    }
}

pub fn classify_wallet(raw: Option<&str>) -> WalletCheck {
    let Some(raw) = raw else {
        return WalletCheck::Missing;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return WalletCheck::Missing;
    }
    if let Some(hex_part) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        if hex_part.len() == HEX_ACCOUNT_LEN && hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return WalletCheck::Valid(WalletAddress::new(format!("0x{}", hex_part.to_ascii_lowercase())));
        }
        return WalletCheck::Malformed(trimmed.to_string());
    }
    if (SS58_MIN_LEN..=SS58_MAX_LEN).contains(&trimmed.len()) && trimmed.bytes().all(is_base58_byte) {
        return WalletCheck::Valid(WalletAddress::new(trimmed));
    }
    WalletCheck::Malformed(trimmed.to_string())
}

pub fn is_valid_wallet(raw: &str) -> bool {
    classify_wallet(Some(raw)).is_valid()
}

fn is_base58_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() && !matches!(b, b'0' | b'O' | b'I' | b'l')
}
