//! Signing capability injected into the submitter.

mod local;
mod secret;

pub use local::LocalSigner;
pub use secret::{EnvSecretStore, SecretBytes, SECRET_ENV_PREFIX};

use crate::domain::{SignedTransaction, UnsignedTransaction};
use crate::foundation::{PipelineError, WalletAddress};
use async_trait::async_trait;

/// Opaque signer scoped to one organizer wallet.
///
/// Implementations may be remote and offline; `SignerUnavailable` is treated as retryable.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, tx: &UnsignedTransaction, wallet: &WalletAddress) -> Result<SignedTransaction, PipelineError>;
}
