mod types;
mod wallet;

pub use types::{CheckIn, CheckInWire, EventDetails};
pub use wallet::{classify_wallet, is_valid_wallet, WalletCheck};
