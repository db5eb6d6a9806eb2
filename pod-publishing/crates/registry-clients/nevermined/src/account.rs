use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use pod_publishing_registry_client_interface::{AccountSigner, RegistryError};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::AccountError;

/// Publisher account backed by a decrypted local key.
#[derive(Clone, Debug)]
pub struct LocalAccount {
    signer: PrivateKeySigner,
}

impl LocalAccount {
    /// Unlock an encrypted JSON keystore.
    ///
    /// `credentials` is the keystore document itself and must carry the account `address`.
    /// The keystore decoder only reads from disk, so the document is staged in a temporary
    /// file that is removed when this function returns, on success and on error alike.
    pub fn from_keystore(credentials: &serde_json::Value, password: &str) -> Result<Self, AccountError> {
        Self::from_keystore_in(credentials, password, &std::env::temp_dir())
    }

    /// Same as [`LocalAccount::from_keystore`], staging the key file under `staging_dir`.
    pub fn from_keystore_in(
        credentials: &serde_json::Value,
        password: &str,
        staging_dir: &Path,
    ) -> Result<Self, AccountError> {
        let claimed =
            credentials.get("address").and_then(serde_json::Value::as_str).ok_or(AccountError::MissingAddress)?;
        let expected = Address::from_str(claimed).map_err(|_| AccountError::InvalidAddress(claimed.to_string()))?;

        let mut key_file = NamedTempFile::new_in(staging_dir)?;
        serde_json::to_writer(&mut key_file, credentials)?;
        key_file.flush()?;
        debug!(address = %expected, "Decrypting account keystore");

        let signer = PrivateKeySigner::decrypt_keystore(key_file.path(), password)
            .map_err(|e| AccountError::Decrypt(e.to_string()))?;

        if signer.address() != expected {
            return Err(AccountError::AddressMismatch { expected, actual: signer.address() });
        }
        Ok(Self { signer })
    }

    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

#[async_trait]
impl AccountSigner for LocalAccount {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_hash(&self, hash: B256) -> Result<Bytes, RegistryError> {
        let signature = self.signer.sign_hash(&hash).await.map_err(|e| RegistryError::Signer(e.to_string()))?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}
