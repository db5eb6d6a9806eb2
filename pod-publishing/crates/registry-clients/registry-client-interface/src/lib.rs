pub mod error;
pub mod provenance;

use std::str::FromStr;

use alloy::primitives::{hex, keccak256, Address, Bytes, B256};
use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

pub use crate::error::RegistryError;
pub use crate::provenance::{ProvenanceEvent, ProvenanceKind};

/// Method prefix of every DID handed out by the registry.
pub const DID_PREFIX: &str = "did:nv:";

/// An asset record resolved from the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAsset {
    pub did: String,
    /// Metadata attributes of the asset, kept as an opaque document.
    pub metadata: serde_json::Value,
}

/// The registry record created by a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAsset {
    pub did: String,
}

/// Trait for every asset registry to implement
#[automock]
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Should fetch the asset record identified by `did`.
    async fn resolve_asset(&self, did: &str) -> Result<WorkflowAsset, RegistryError>;

    /// Should return the account currently owning `did`.
    async fn asset_owner(&self, did: &str) -> Result<Address, RegistryError>;

    /// Should register a new asset described by `metadata`, served by `providers`.
    /// Failures caused by the registry refusing the record surface as [RegistryError::Rejected].
    async fn create_asset(
        &self,
        metadata: &serde_json::Value,
        providers: &[Address],
    ) -> Result<RegisteredAsset, RegistryError>;

    /// Should hand ownership of `did` over to `new_owner`.
    async fn transfer_ownership(&self, did: &str, new_owner: Address) -> Result<(), RegistryError>;
}

/// Trait for the audit trail linking activities, agents and assets
#[automock]
#[async_trait]
pub trait ProvenanceRecorder: Send + Sync {
    async fn record(&self, event: ProvenanceEvent) -> Result<(), RegistryError>;
}

/// The account publishing assets and signing on their behalf
#[automock]
#[async_trait]
pub trait AccountSigner: Send + Sync {
    fn address(&self) -> Address;

    /// Signs an already hashed message. Returns the 65 byte `r || s || v` signature.
    async fn sign_hash(&self, hash: B256) -> Result<Bytes, RegistryError>;
}

/// Convert a `did:nv:<hex>` identifier into the 32 byte form used on-chain.
pub fn did_to_bytes32(did: &str) -> Result<B256, RegistryError> {
    let id = did.strip_prefix(DID_PREFIX).unwrap_or(did);
    B256::from_str(id).map_err(|e| RegistryError::InvalidDid(format!("{did}: {e}")))
}

/// Inverse of [did_to_bytes32].
pub fn bytes32_to_did(id: B256) -> String {
    format!("{DID_PREFIX}{}", hex::encode(id))
}

/// On-chain identifier of a named activity.
pub fn activity_id(name: &str) -> B256 {
    keccak256(name.as_bytes())
}

/// Provenance ids are 16 byte UUIDs stored in a `bytes32` slot, so they are right padded like any ABI `bytesN`.
pub fn provenance_id_bytes(id: &uuid::Uuid) -> B256 {
    B256::right_padding_from(id.as_bytes())
}
