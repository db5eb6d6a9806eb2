use std::collections::BTreeMap;

use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

pub const DDO_CONTEXT: &str = "https://w3id.org/did/v1";
pub const SERVICE_TYPE_METADATA: &str = "metadata";
pub const SERVICE_TYPE_ACCESS: &str = "access";
pub const SERVICE_TYPE_AUTHORIZATION: &str = "authorization";
const PUBLIC_KEY_TYPE: &str = "EthereumECDSAKey";
const AUTHENTICATION_TYPE: &str = "RsaSignatureAuthentication2018";
const PROOF_TYPE: &str = "DDOIntegritySignature";

/// DID document as stored by the metadata service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ddo {
    #[serde(rename = "@context", default = "default_context")]
    pub context: String,
    pub id: String,
    #[serde(default)]
    pub public_key: Vec<PublicKey>,
    #[serde(default)]
    pub authentication: Vec<Authentication>,
    #[serde(default)]
    pub service: Vec<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authentication {
    #[serde(rename = "type")]
    pub auth_type: String,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub index: u32,
    pub service_endpoint: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,
    pub created: String,
    pub creator: String,
    pub signature_value: String,
    #[serde(default)]
    pub checksum: BTreeMap<String, String>,
}

/// Where the services of a freshly published asset are reachable.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub metadata: String,
    pub access: String,
    pub authorization: String,
}

fn default_context() -> String {
    DDO_CONTEXT.to_string()
}

impl Ddo {
    /// Attributes of the `metadata` service, which is what callers treat as the asset metadata.
    pub fn metadata_attributes(&self) -> Option<&serde_json::Value> {
        self.service.iter().find(|s| s.service_type == SERVICE_TYPE_METADATA).map(|s| &s.attributes)
    }

    /// Assemble the document describing a new asset owned by `publisher`.
    pub fn for_asset(
        did: &str,
        publisher: Address,
        metadata: &serde_json::Value,
        endpoints: &ServiceEndpoints,
        created: &str,
        checksum: B256,
        signature: &Bytes,
    ) -> Self {
        let key_id = format!("{did}#keys-1");
        let publisher = publisher.to_checksum(None);

        let service = vec![
            Service {
                service_type: SERVICE_TYPE_METADATA.to_string(),
                index: 0,
                service_endpoint: endpoints.metadata.clone(),
                attributes: metadata.clone(),
            },
            Service {
                service_type: SERVICE_TYPE_ACCESS.to_string(),
                index: 1,
                service_endpoint: endpoints.access.clone(),
                attributes: serde_json::json!({
                    "main": { "name": "dataAssetAccess", "creator": publisher, "price": price_of(metadata) }
                }),
            },
            Service {
                service_type: SERVICE_TYPE_AUTHORIZATION.to_string(),
                index: 2,
                service_endpoint: endpoints.authorization.clone(),
                attributes: serde_json::json!({ "main": { "service": "SecretStore" } }),
            },
        ];

        Self {
            context: default_context(),
            id: did.to_string(),
            public_key: vec![PublicKey {
                id: key_id.clone(),
                key_type: PUBLIC_KEY_TYPE.to_string(),
                owner: publisher.clone(),
            }],
            authentication: vec![Authentication { auth_type: AUTHENTICATION_TYPE.to_string(), public_key: key_id }],
            service,
            proof: Some(Proof {
                proof_type: PROOF_TYPE.to_string(),
                created: created.to_string(),
                creator: publisher,
                signature_value: signature.to_string(),
                checksum: BTreeMap::from([(SERVICE_TYPE_METADATA.to_string(), checksum.to_string())]),
            }),
            created: Some(created.to_string()),
        }
    }
}

fn price_of(metadata: &serde_json::Value) -> serde_json::Value {
    metadata.pointer("/main/price").cloned().unwrap_or(serde_json::Value::Null)
}
