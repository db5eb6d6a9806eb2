pub mod error;
pub mod s3;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
pub use error::StorageError;

/// Trait defining the object storage operations a publishing run needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Create a bucket. A location constraint is attached for every region but `us-east-1`.
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), StorageError>;

    /// Replace the access policy of a bucket with `policy`, a JSON policy document
    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StorageError>;

    /// Upload the local file at `path` as `key`
    async fn upload_object(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StorageError>;

    /// Issue a download URL for `key` that stays valid for `expires_in`
    async fn presigned_url(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String, StorageError>;
}

/// Policy granting anonymous read access to a bucket and every object in it.
pub fn public_read_policy(bucket: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "AWS": ["*"] },
                "Action": ["s3:GetBucketLocation", "s3:ListBucket"],
                "Resource": [format!("arn:aws:s3:::{bucket}")],
            },
            {
                "Effect": "Allow",
                "Principal": { "AWS": ["*"] },
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{bucket}/*")],
            },
        ],
    })
    .to_string()
}
