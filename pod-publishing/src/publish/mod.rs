//! The publishing pipeline.
//!
//! Steps run strictly one after the other. Asset creation and ownership transfer are retried
//! according to the run's [RetryPolicy](crate::retry::RetryPolicy); every other failure ends the run
//! on the spot, leaving the bucket and any uploaded objects behind.

use alloy::primitives::{eip191_hash_message, Address};
use chrono::Utc;
use pod_publishing_registry_client_interface::{
    activity_id, did_to_bytes32, provenance_id_bytes, ProvenanceEvent, RegisteredAsset, WorkflowAsset,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::collector::{self, CollectedFile};
use crate::core::client::storage::public_read_policy;
use crate::core::config::Config;
use crate::metadata::{build_metadata, AssetMetadata, PublishedFile};
use crate::retry::retry;
use crate::PublishResult;

pub const BUCKET_PREFIX: &str = "pod-publishing";
pub const ACTIVITY_COMPUTE: &str = "compute";
pub const ACTIVITY_PUBLISHED: &str = "published";
pub const ACTIVITY_TRANSFER_OWNERSHIP: &str = "transferOwnership";

/// What a successful run left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub workflow_did: String,
    pub asset_did: String,
    pub bucket: String,
    pub files: Vec<PublishedFile>,
    /// Owner of the published asset when ownership was transferred
    pub new_owner: Option<Address>,
}

pub fn bucket_name() -> String {
    format!("{}-{}", BUCKET_PREFIX, Uuid::new_v4())
}

/// Publish the outputs of the configured workflow.
pub async fn publish(config: &Config) -> PublishResult<PublishOutcome> {
    let params = config.params();

    let workflow = resolve_workflow(config).await?;
    let owner = if params.record_provenance || params.transfer_ownership {
        Some(workflow_owner(config, &workflow.did).await?)
    } else {
        None
    };
    let provenance_id = Uuid::new_v4();
    let provenance_agent = owner.filter(|_| params.record_provenance);

    let files = collect_files(config)?;
    let bucket = create_bucket(config).await?;

    if let Some(agent) = provenance_agent {
        record_provenance_used(config, &workflow, agent, provenance_id).await?;
    }

    let files = upload_files(config, &bucket, files).await?;
    let metadata = build_metadata(
        &workflow.metadata,
        files.clone(),
        params.metadata_layout,
        params.execution_id.as_deref(),
        Utc::now(),
    );
    let asset = create_asset_record(config, &metadata).await?;

    if let Some(agent) = provenance_agent {
        record_provenance_derivation(config, &workflow, &asset, agent, provenance_id).await?;
    }

    let new_owner = match owner.filter(|_| params.transfer_ownership) {
        Some(new_owner) => {
            transfer_ownership(config, &asset, new_owner).await?;
            if let Some(agent) = provenance_agent {
                record_provenance_association(config, &workflow, agent, provenance_id).await?;
            }
            Some(new_owner)
        }
        None => None,
    };

    Ok(PublishOutcome { workflow_did: workflow.did, asset_did: asset.did, bucket, files, new_owner })
}

#[tracing::instrument(skip_all, fields(step = "resolve_workflow", did = %config.params().workflow_did))]
async fn resolve_workflow(config: &Config) -> PublishResult<WorkflowAsset> {
    let workflow = config.registry().resolve_asset(&config.params().workflow_did).await?;
    info!(did = %workflow.did, "Resolved workflow");
    debug!(metadata = %workflow.metadata, "Workflow metadata");
    Ok(workflow)
}

#[tracing::instrument(skip_all, fields(step = "resolve_workflow", did = %did))]
async fn workflow_owner(config: &Config, did: &str) -> PublishResult<Address> {
    let owner = config.registry().asset_owner(did).await?;
    debug!(owner = %owner, "Resolved workflow owner");
    Ok(owner)
}

#[tracing::instrument(skip_all, fields(step = "collect_files", path = %config.params().outputs_path.display()))]
fn collect_files(config: &Config) -> PublishResult<Vec<CollectedFile>> {
    let params = config.params();
    let mut files = collector::collect_files(&params.outputs_path)?;
    if params.rename_files {
        files = collector::rename_with_unique_prefix(files)?;
    }
    info!(count = files.len(), "Collected output files");
    Ok(files)
}

#[tracing::instrument(skip_all, fields(step = "create_bucket"))]
async fn create_bucket(config: &Config) -> PublishResult<String> {
    let params = config.params();
    let bucket = bucket_name();
    config.storage().create_bucket(&bucket, &params.bucket_region).await?;
    info!(bucket = %bucket, "Created bucket");

    if params.public_read {
        config.storage().set_bucket_policy(&bucket, &public_read_policy(&bucket)).await?;
        info!(bucket = %bucket, "Set bucket policy to public read");
    }
    Ok(bucket)
}

/// Uploads one file at a time; each file is presigned as soon as it is stored.
#[tracing::instrument(skip_all, fields(step = "upload_files", bucket = %bucket))]
async fn upload_files(config: &Config, bucket: &str, files: Vec<CollectedFile>) -> PublishResult<Vec<PublishedFile>> {
    let expiry = config.params().presign_expiry;
    let mut published = Vec::with_capacity(files.len());
    for file in files {
        config.storage().upload_object(bucket, &file.key, &file.path).await?;
        info!(path = %file.path.display(), key = %file.key, "Uploaded file");

        let url = config.storage().presigned_url(bucket, &file.key, expiry).await?;
        debug!(name = %file.name, url = %url, "File url");
        published.push(PublishedFile::new(file, url));
    }
    Ok(published)
}

#[tracing::instrument(skip_all, fields(step = "create_asset"))]
async fn create_asset_record(config: &Config, metadata: &AssetMetadata) -> PublishResult<RegisteredAsset> {
    let document = serde_json::to_value(metadata)?;
    let providers = [config.account().address()];
    let (registry, document, providers) = (config.registry(), &document, providers.as_slice());
    let asset =
        retry(&config.params().retry_policy, "create_asset", move || registry.create_asset(document, providers)).await?;
    info!(did = %asset.did, "Published asset");
    Ok(asset)
}

#[tracing::instrument(skip_all, fields(step = "transfer_ownership", did = %asset.did))]
async fn transfer_ownership(config: &Config, asset: &RegisteredAsset, new_owner: Address) -> PublishResult<()> {
    let (registry, did) = (config.registry(), asset.did.as_str());
    retry(&config.params().retry_policy, "transfer_ownership", move || registry.transfer_ownership(did, new_owner))
        .await?;
    info!(from = %config.account().address(), to = %new_owner, "Transferred ownership");
    Ok(())
}

#[tracing::instrument(skip_all, fields(step = "record_provenance", kind = "used"))]
async fn record_provenance_used(
    config: &Config,
    workflow: &WorkflowAsset,
    agent: Address,
    provenance_id: Uuid,
) -> PublishResult<()> {
    let signature = config.account().sign_hash(eip191_hash_message(provenance_id.to_string())).await?;
    let event = ProvenanceEvent::Used {
        provenance_id: provenance_id_bytes(&provenance_id),
        did: did_to_bytes32(&workflow.did)?,
        agent_id: agent,
        activity_id: activity_id(ACTIVITY_COMPUTE),
        signature,
        attributes: ACTIVITY_COMPUTE.to_string(),
    };
    config.provenance().record(event).await?;
    debug!(provenance_id = %provenance_id, "Recorded workflow use");
    Ok(())
}

#[tracing::instrument(skip_all, fields(step = "record_provenance", kind = "wasDerivedFrom"))]
async fn record_provenance_derivation(
    config: &Config,
    workflow: &WorkflowAsset,
    asset: &RegisteredAsset,
    agent: Address,
    provenance_id: Uuid,
) -> PublishResult<()> {
    let event = ProvenanceEvent::WasDerivedFrom {
        provenance_id: provenance_id_bytes(&provenance_id),
        new_entity_did: did_to_bytes32(&asset.did)?,
        used_entity_did: did_to_bytes32(&workflow.did)?,
        agent_id: agent,
        activity_id: activity_id(ACTIVITY_PUBLISHED),
        attributes: ACTIVITY_PUBLISHED.to_string(),
    };
    config.provenance().record(event).await?;
    debug!(provenance_id = %provenance_id, "Recorded asset derivation");
    Ok(())
}

#[tracing::instrument(skip_all, fields(step = "record_provenance", kind = "wasAssociatedWith"))]
async fn record_provenance_association(
    config: &Config,
    workflow: &WorkflowAsset,
    agent: Address,
    provenance_id: Uuid,
) -> PublishResult<()> {
    let event = ProvenanceEvent::WasAssociatedWith {
        provenance_id: provenance_id_bytes(&provenance_id),
        did: did_to_bytes32(&workflow.did)?,
        agent_id: agent,
        activity_id: activity_id(ACTIVITY_TRANSFER_OWNERSHIP),
        attributes: ACTIVITY_TRANSFER_OWNERSHIP.to_string(),
    };
    config.provenance().record(event).await?;
    debug!(provenance_id = %provenance_id, "Recorded ownership transfer");
    Ok(())
}
