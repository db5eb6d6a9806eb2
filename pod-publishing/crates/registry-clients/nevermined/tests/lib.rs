use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use assert_matches::assert_matches;
use httpmock::MockServer;
use pod_publishing_nevermined_client::{connect, LocalAccount, NeverminedValidatedArgs};
use pod_publishing_registry_client_interface::{RegistryClient, RegistryError};
use serde_json::json;
use url::Url;

const WORKFLOW_DID: &str = "did:nv:0c7f2b5fc2b35d3b1b4ff2a5d29d19e1b6a1f1e9d1a4a9f4be8fbbc1d8e1c2a3";

fn account() -> LocalAccount {
    LocalAccount::from_signer(PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11)).unwrap())
}

fn args(metadata_url: &str, node_url: &str) -> NeverminedValidatedArgs {
    NeverminedValidatedArgs {
        node_url: Url::parse(node_url).unwrap(),
        metadata_url: Url::parse(metadata_url).unwrap(),
        gateway_url: Url::parse("http://localhost:8030").unwrap(),
        secret_store_url: Url::parse("http://localhost:12001").unwrap(),
        did_registry_address: Address::repeat_byte(0x42),
    }
}

#[tokio::test]
async fn resolve_asset_returns_metadata_service_attributes() {
    let metadata_server = MockServer::start();
    let resolve_mock = metadata_server.mock(|when, then| {
        when.method("GET").path(format!("/api/v1/metadata/assets/ddo/{WORKFLOW_DID}"));
        then.status(200).header("content-type", "application/json").json_body(json!({
            "@context": "https://w3id.org/did/v1",
            "id": WORKFLOW_DID,
            "service": [
                {
                    "type": "metadata",
                    "index": 0,
                    "serviceEndpoint": metadata_server.url(format!("/api/v1/metadata/assets/ddo/{WORKFLOW_DID}")),
                    "attributes": { "main": { "type": "workflow", "name": "word count" } }
                }
            ]
        }));
    });

    let client = connect(&args(&metadata_server.base_url(), "http://localhost:8545"), account());
    let workflow = client.resolve_asset(WORKFLOW_DID).await.expect("workflow should resolve");

    resolve_mock.assert();
    assert_eq!(workflow.did, WORKFLOW_DID);
    assert_eq!(workflow.metadata, json!({ "main": { "type": "workflow", "name": "word count" } }));
}

#[tokio::test]
async fn resolve_asset_reports_unknown_did() {
    let metadata_server = MockServer::start();
    metadata_server.mock(|when, then| {
        when.method("GET").path(format!("/api/v1/metadata/assets/ddo/{WORKFLOW_DID}"));
        then.status(404);
    });

    let client = connect(&args(&metadata_server.base_url(), "http://localhost:8545"), account());
    let result = client.resolve_asset(WORKFLOW_DID).await;

    assert_matches!(result, Err(RegistryError::NotFound(did)) if did == WORKFLOW_DID);
}

#[tokio::test]
async fn resolve_asset_failures_are_not_retryable() {
    let metadata_server = MockServer::start();
    metadata_server.mock(|when, then| {
        when.method("GET").path(format!("/api/v1/metadata/assets/ddo/{WORKFLOW_DID}"));
        then.status(500).body("database unavailable");
    });

    let client = connect(&args(&metadata_server.base_url(), "http://localhost:8545"), account());
    let err = client.resolve_asset(WORKFLOW_DID).await.unwrap_err();

    assert_matches!(&err, RegistryError::Api { status: 500, message, .. } if message == "database unavailable");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn resolve_asset_without_metadata_service_is_a_parse_error() {
    let metadata_server = MockServer::start();
    metadata_server.mock(|when, then| {
        when.method("GET").path(format!("/api/v1/metadata/assets/ddo/{WORKFLOW_DID}"));
        then.status(200).json_body(json!({ "id": WORKFLOW_DID, "service": [] }));
    });

    let client = connect(&args(&metadata_server.base_url(), "http://localhost:8545"), account());
    assert_matches!(client.resolve_asset(WORKFLOW_DID).await, Err(RegistryError::Parse { .. }));
}

#[tokio::test]
async fn create_asset_collapses_node_failures_into_a_rejection() {
    let metadata_server = MockServer::start();
    let store_mock = metadata_server.mock(|when, then| {
        when.method("POST").path("/api/v1/metadata/assets/ddo");
        then.status(201);
    });
    // a node that answers every JSON-RPC call with 500
    let node = MockServer::start();
    node.mock(|when, then| {
        when.method("POST");
        then.status(500);
    });

    let client = connect(&args(&metadata_server.base_url(), &node.base_url()), account());
    let err = client
        .create_asset(&json!({ "main": { "type": "dataset" } }), &[Address::repeat_byte(1)])
        .await
        .expect_err("the node refuses every call");

    assert_matches!(&err, RegistryError::Rejected { operation, .. } if operation == "create_asset");
    assert!(err.is_retryable());
    // nothing reaches the metadata service until the DID is registered on-chain
    store_mock.assert_hits(0);
}

#[tokio::test]
async fn transfer_ownership_rejects_malformed_did_without_touching_the_node() {
    let node = MockServer::start();
    let rpc_mock = node.mock(|when, then| {
        when.method("POST");
        then.status(500);
    });

    let client = connect(&args("http://localhost:5000", &node.base_url()), account());
    let result = client.transfer_ownership("did:nv:not-hex", Address::repeat_byte(2)).await;

    assert_matches!(result, Err(RegistryError::InvalidDid(_)));
    rpc_mock.assert_hits(0);
}

#[test]
fn ddo_urls_ignore_trailing_slashes() {
    let client = connect(&args("http://metadata:5000/", "http://localhost:8545"), account());
    assert_eq!(client.ddo_url("did:nv:01"), "http://metadata:5000/api/v1/metadata/assets/ddo/did:nv:01");
}
