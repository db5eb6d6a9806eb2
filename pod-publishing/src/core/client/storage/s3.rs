use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use tracing::debug;

use crate::core::client::storage::{StorageClient, StorageError};
use crate::types::params::StorageParams;

/// Region in which S3 rejects an explicit location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// S3 compatible object store, typically a MinIO deployment next to the compute node.
#[derive(Clone, Debug)]
pub struct S3StorageClient {
    pub(crate) client: Arc<Client>,
}

impl S3StorageClient {
    /// Creates a new instance of S3StorageClient from the storage parameters.
    /// Requests use path style addressing, which MinIO requires.
    pub async fn new(params: &StorageParams) -> Self {
        let sdk_config = Self::sdk_config(params).await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(true).build();
        Self { client: Arc::new(Client::from_conf(s3_config)) }
    }

    async fn sdk_config(params: &StorageParams) -> SdkConfig {
        let credentials = Credentials::from_keys(&params.access_key, &params.secret_key, None);
        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(params.region.clone()))
            .endpoint_url(params.endpoint.as_str().trim_end_matches('/'))
            .credentials_provider(credentials)
            .load()
            .await
    }
}

#[async_trait]
impl StorageClient for S3StorageClient {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), StorageError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if region != DEFAULT_REGION {
            let constraint = BucketLocationConstraint::from(region);
            let cfg = CreateBucketConfiguration::builder().location_constraint(constraint).build();
            request = request.create_bucket_configuration(cfg);
        }
        request.send().await?;
        Ok(())
    }

    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StorageError> {
        self.client.put_bucket_policy().bucket(bucket).policy(policy).send().await?;
        Ok(())
    }

    async fn upload_object(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StorageError> {
        let body = ByteStream::from_path(path).await.map_err(|e| StorageError::ObjectStreamError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let content_type = mime_guess::from_path(path).first_raw();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(body)
            .send()
            .await?;
        Ok(())
    }

    async fn presigned_url(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(expires_in)?;
        let request = self.client.get_object().bucket(bucket).key(key).presigned(config).await?;
        debug!(bucket, key, "Presigned object download");
        Ok(request.uri().to_string())
    }
}
