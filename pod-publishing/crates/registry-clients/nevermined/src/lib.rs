pub mod account;
pub mod contracts;
pub mod ddo;
pub mod error;

use alloy::network::Ethereum;
use alloy::primitives::{eip191_hash_message, keccak256, Address};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use pod_publishing_registry_client_interface::{
    bytes32_to_did, did_to_bytes32, AccountSigner, ProvenanceEvent, ProvenanceRecorder, RegisteredAsset,
    RegistryClient, RegistryError, WorkflowAsset,
};
use reqwest::StatusCode;
use tracing::{debug, info};
use url::Url;

pub use crate::account::LocalAccount;
use crate::contracts::{hash_did, DIDRegistry};
use crate::ddo::{Ddo, ServiceEndpoints};
pub use crate::error::AccountError;
use crate::error::from_reqwest_error;

const DDO_PATH: &str = "api/v1/metadata/assets/ddo";
const ACCESS_PATH: &str = "api/v1/gateway/services/access/initialize";

#[derive(Debug, Clone)]
pub struct NeverminedValidatedArgs {
    /// JSON-RPC endpoint of the node hosting the registry contracts
    pub node_url: Url,
    pub metadata_url: Url,
    pub gateway_url: Url,
    pub secret_store_url: Url,
    pub did_registry_address: Address,
}

/// Registry backed by the Nevermined metadata service and the `DIDRegistry` contract.
#[derive(Clone)]
pub struct NeverminedClient<P> {
    http: reqwest::Client,
    metadata_url: Url,
    gateway_url: Url,
    secret_store_url: Url,
    account: LocalAccount,
    did_registry: DIDRegistry::DIDRegistryInstance<Http<Client>, P>,
}

/// Connect to the node from `args`, sending transactions signed by `account`.
pub fn connect(
    args: &NeverminedValidatedArgs,
    account: LocalAccount,
) -> NeverminedClient<impl Provider<Http<Client>, Ethereum> + Clone> {
    let provider =
        ProviderBuilder::new().with_recommended_fillers().wallet(account.wallet()).on_http(args.node_url.clone());
    NeverminedClient::with_provider(args, account, provider)
}

impl<P> NeverminedClient<P>
where
    P: Provider<Http<Client>, Ethereum> + Clone,
{
    pub fn with_provider(args: &NeverminedValidatedArgs, account: LocalAccount, provider: P) -> Self {
        Self {
            http: reqwest::Client::new(),
            metadata_url: args.metadata_url.clone(),
            gateway_url: args.gateway_url.clone(),
            secret_store_url: args.secret_store_url.clone(),
            account,
            did_registry: DIDRegistry::new(args.did_registry_address, provider),
        }
    }

    /// Location of the document describing `did` in the metadata service.
    pub fn ddo_url(&self, did: &str) -> String {
        format!("{}/{}", self.ddo_collection_url(), did)
    }

    fn ddo_collection_url(&self) -> String {
        format!("{}/{}", self.metadata_url.as_str().trim_end_matches('/'), DDO_PATH)
    }

    fn service_endpoints(&self, did: &str) -> ServiceEndpoints {
        ServiceEndpoints {
            metadata: self.ddo_url(did),
            access: format!("{}/{}", self.gateway_url.as_str().trim_end_matches('/'), ACCESS_PATH),
            authorization: self.secret_store_url.to_string(),
        }
    }

    async fn store_ddo(&self, ddo: &Ddo) -> Result<(), RegistryError> {
        const OPERATION: &str = "create_asset";
        let response = self
            .http
            .post(self.ddo_collection_url())
            .json(ddo)
            .send()
            .await
            .map_err(|e| RegistryError::rejected(OPERATION, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(RegistryError::rejected(OPERATION, format!("metadata service answered {status}: {body}")))
    }
}

fn ensure_success(operation: &str, receipt: TransactionReceipt) -> Result<TransactionReceipt, RegistryError> {
    if receipt.status() {
        Ok(receipt)
    } else {
        Err(RegistryError::rejected(operation, format!("transaction {} reverted", receipt.transaction_hash)))
    }
}

fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[async_trait]
impl<P> RegistryClient for NeverminedClient<P>
where
    P: Provider<Http<Client>, Ethereum> + Clone + 'static,
{
    #[tracing::instrument(skip(self))]
    async fn resolve_asset(&self, did: &str) -> Result<WorkflowAsset, RegistryError> {
        const OPERATION: &str = "resolve_asset";
        let response =
            self.http.get(self.ddo_url(did)).send().await.map_err(|e| from_reqwest_error(OPERATION, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RegistryError::NotFound(did.to_string())),
            status if status.is_success() => {
                let ddo: Ddo = response.json().await.map_err(|e| from_reqwest_error(OPERATION, e))?;
                let metadata = ddo
                    .metadata_attributes()
                    .cloned()
                    .ok_or_else(|| RegistryError::parse_error(OPERATION, format!("{did} has no metadata service")))?;
                debug!(did = %ddo.id, "Resolved asset document");
                Ok(WorkflowAsset { did: ddo.id, metadata })
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(RegistryError::Api { operation: OPERATION.to_string(), status: status.as_u16(), message })
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn asset_owner(&self, did: &str) -> Result<Address, RegistryError> {
        let owner = self
            .did_registry
            .getDIDOwner(did_to_bytes32(did)?)
            .call()
            .await
            .map_err(|e| RegistryError::transport("asset_owner", e))?
            ._0;
        Ok(owner)
    }

    #[tracing::instrument(skip(self, metadata))]
    async fn create_asset(
        &self,
        metadata: &serde_json::Value,
        providers: &[Address],
    ) -> Result<RegisteredAsset, RegistryError> {
        const OPERATION: &str = "create_asset";
        let publisher = self.account.address();
        let encoded = serde_json::to_vec(metadata).map_err(|e| RegistryError::rejected(OPERATION, e))?;
        let checksum = keccak256(encoded);
        let did_seed = checksum;
        let did = bytes32_to_did(hash_did(did_seed, publisher));
        let endpoints = self.service_endpoints(&did);

        info!(did = %did, publisher = %publisher, "Registering asset on-chain");
        let receipt = self
            .did_registry
            .registerAttribute(did_seed, checksum, providers.to_vec(), endpoints.metadata.clone())
            .send()
            .await
            .map_err(|e| RegistryError::rejected(OPERATION, e))?
            .get_receipt()
            .await
            .map_err(|e| RegistryError::rejected(OPERATION, e))?;
        let receipt = ensure_success(OPERATION, receipt)?;
        debug!(tx_hash = %receipt.transaction_hash, "DID attributes registered");

        let signature = self
            .account
            .sign_hash(eip191_hash_message(checksum.to_string()))
            .await
            .map_err(|e| RegistryError::rejected(OPERATION, e))?;
        let ddo = Ddo::for_asset(&did, publisher, metadata, &endpoints, &now_iso(), checksum, &signature);
        self.store_ddo(&ddo).await?;

        Ok(RegisteredAsset { did })
    }

    #[tracing::instrument(skip(self))]
    async fn transfer_ownership(&self, did: &str, new_owner: Address) -> Result<(), RegistryError> {
        const OPERATION: &str = "transfer_ownership";
        let receipt = self
            .did_registry
            .transferDIDOwnership(did_to_bytes32(did)?, new_owner)
            .send()
            .await
            .map_err(|e| RegistryError::rejected(OPERATION, e))?
            .get_receipt()
            .await
            .map_err(|e| RegistryError::rejected(OPERATION, e))?;
        ensure_success(OPERATION, receipt)?;
        Ok(())
    }
}

#[async_trait]
impl<P> ProvenanceRecorder for NeverminedClient<P>
where
    P: Provider<Http<Client>, Ethereum> + Clone + 'static,
{
    #[tracing::instrument(skip_all, fields(kind = %event.kind(), attributes = %event.attributes()))]
    async fn record(&self, event: ProvenanceEvent) -> Result<(), RegistryError> {
        let operation = event.kind().to_string();
        let pending = match event {
            ProvenanceEvent::Used { provenance_id, did, agent_id, activity_id, signature, attributes } => {
                self.did_registry.used(provenance_id, did, agent_id, activity_id, signature, attributes).send().await
            }
            ProvenanceEvent::WasDerivedFrom {
                provenance_id,
                new_entity_did,
                used_entity_did,
                agent_id,
                activity_id,
                attributes,
            } => {
                self.did_registry
                    .wasDerivedFrom(provenance_id, new_entity_did, used_entity_did, agent_id, activity_id, attributes)
                    .send()
                    .await
            }
            ProvenanceEvent::WasAssociatedWith { provenance_id, did, agent_id, activity_id, attributes } => {
                self.did_registry.wasAssociatedWith(provenance_id, did, agent_id, activity_id, attributes).send().await
            }
        }
        .map_err(|e| RegistryError::rejected(&operation, e))?;

        let receipt = pending.get_receipt().await.map_err(|e| RegistryError::rejected(&operation, e))?;
        ensure_success(&operation, receipt)?;
        Ok(())
    }
}
