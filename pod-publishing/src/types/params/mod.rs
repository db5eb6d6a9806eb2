use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use pod_publishing_nevermined_client::NeverminedValidatedArgs;
use url::Url;

use crate::cli::Cli;
use crate::metadata::MetadataLayout;
use crate::retry::RetryPolicy;
use crate::{PublishError, PublishResult};

/// Directory under the workflow volume holding the files to publish
pub const OUTPUTS_DIR: &str = "outputs";

/// PublishParams - What to publish and which optional stages to run
#[derive(Debug, Clone)]
pub struct PublishParams {
    pub workflow_did: String,
    pub outputs_path: PathBuf,
    pub execution_id: Option<String>,
    pub bucket_region: String,
    pub presign_expiry: Duration,
    pub public_read: bool,
    pub record_provenance: bool,
    pub transfer_ownership: bool,
    pub rename_files: bool,
    pub metadata_layout: MetadataLayout,
    pub retry_policy: RetryPolicy,
}

/// StorageParams - Connection settings of the object store
#[derive(Debug, Clone)]
pub struct StorageParams {
    pub endpoint: Url,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// AccountParams - Encrypted keystore of the publisher and its password
#[derive(Debug, Clone)]
pub struct AccountParams {
    pub credentials: serde_json::Value,
    pub password: String,
}

impl TryFrom<Cli> for PublishParams {
    type Error = PublishError;
    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let outputs_path = cli.path.join(OUTPUTS_DIR);
        if !outputs_path.is_dir() {
            return Err(PublishError::MissingOutputsError(outputs_path));
        }

        let backoff = Duration::from_secs(cli.retry_args.retry_backoff_secs);
        let retry_policy = if cli.retry_args.unbounded_retry {
            RetryPolicy::unbounded(backoff)
        } else {
            RetryPolicy::bounded(cli.retry_args.max_retries, backoff)
        };

        Ok(Self {
            workflow_did: cli.workflow,
            outputs_path,
            execution_id: cli.execution_id,
            bucket_region: cli.storage_args.storage_region,
            presign_expiry: Duration::from_secs(cli.storage_args.presign_expiry_secs),
            public_read: cli.pipeline_args.public_read,
            record_provenance: cli.pipeline_args.record_provenance,
            transfer_ownership: cli.pipeline_args.transfer_ownership,
            rename_files: cli.pipeline_args.rename_files,
            metadata_layout: cli.pipeline_args.metadata_layout,
            retry_policy,
        })
    }
}

impl From<Cli> for StorageParams {
    fn from(cli: Cli) -> Self {
        Self {
            endpoint: cli.storage_args.storage_endpoint,
            access_key: cli.storage_args.storage_access_key,
            secret_key: cli.storage_args.storage_secret_key,
            region: cli.storage_args.storage_region,
        }
    }
}

impl TryFrom<Cli> for AccountParams {
    type Error = PublishError;
    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let credentials: serde_json::Value = serde_json::from_str(&cli.credentials)
            .map_err(|e| PublishError::ConfigError(format!("Credentials are not valid JSON: {e}")))?;
        if !credentials.is_object() {
            return Err(PublishError::ConfigError("Credentials must be a JSON object".to_string()));
        }
        if credentials.get("address").and_then(serde_json::Value::as_str).is_none() {
            return Err(PublishError::ConfigError("Credentials are missing the \"address\" field".to_string()));
        }
        Ok(Self { credentials, password: cli.password })
    }
}

impl TryFrom<Cli> for NeverminedValidatedArgs {
    type Error = PublishError;
    fn try_from(cli: Cli) -> PublishResult<Self> {
        let did_registry_address = Address::from_str(&cli.registry_args.did_registry_address).map_err(|e| {
            PublishError::ConfigError(format!(
                "Invalid DIDRegistry address {}: {e}",
                cli.registry_args.did_registry_address
            ))
        })?;
        Ok(Self {
            node_url: cli.node,
            metadata_url: cli.metadata_url,
            gateway_url: cli.gateway_url,
            secret_store_url: cli.secretstore_url,
            did_registry_address,
        })
    }
}
