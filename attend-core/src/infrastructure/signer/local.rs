use super::secret::EnvSecretStore;
use super::Signer;
use crate::domain::{SignedTransaction, UnsignedTransaction};
use crate::foundation::{PipelineError, WalletAddress};
use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey, Verifier, VerifyingKey};
use log::info;
use zeroize::Zeroize;

/// In-process ed25519 signer for the organizer wallet. The key lives only in memory.
pub struct LocalSigner {
    organizer: WalletAddress,
    key: SigningKey,
}

impl LocalSigner {
    pub fn from_seed(organizer: WalletAddress, seed: &[u8]) -> Result<Self, PipelineError> {
        let mut bytes: [u8; 32] = seed.try_into().map_err(|_| PipelineError::SecretDecodeFailed {
            name: "signer.seed".to_string(),
            encoding: "ed25519".to_string(),
            details: format!("expected 32 bytes, got {}", seed.len()),
        })?;
        let key = SigningKey::from_bytes(&bytes);
        bytes.zeroize();
        Ok(Self { organizer, key })
    }

    pub fn from_secret_store(store: &EnvSecretStore, secret_name: &str, organizer: WalletAddress) -> Result<Self, PipelineError> {
        let seed = store.get(secret_name)?;
        let signer = Self::from_seed(organizer, seed.expose_secret())?;
        info!("local signer ready organizer={} public_key={}", signer.organizer, hex::encode(signer.verifying_key().as_bytes()));
        Ok(signer)
    }

    pub fn organizer(&self) -> &WalletAddress {
        &self.organizer
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    pub fn verify(&self, signed: &SignedTransaction) -> Result<(), PipelineError> {
        let signature = ed25519_dalek::Signature::from_slice(&signed.signature)
            .map_err(|err| PipelineError::SigningFailed(format!("malformed signature: {err}")))?;
        self.verifying_key()
            .verify(&signed.payload, &signature)
            .map_err(|err| PipelineError::SigningFailed(format!("signature check failed: {err}")))
    }
}

#[async_trait]
impl Signer for LocalSigner {
    async fn sign(&self, tx: &UnsignedTransaction, wallet: &WalletAddress) -> Result<SignedTransaction, PipelineError> {
        if wallet != &self.organizer || tx.signer != self.organizer {
            return Err(PipelineError::SigningFailed(format!("signer is scoped to {} and refuses {}", self.organizer, wallet)));
        }
        let payload = tx.signing_bytes()?;
        let signature = self.key.sign(&payload);
        Ok(SignedTransaction { payload, signature: signature.to_bytes().to_vec(), signer: self.organizer.clone() })
    }
}
