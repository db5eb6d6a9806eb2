use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::put_bucket_policy::PutBucketPolicyError;
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::presigning::PresigningConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create bucket: {0}")]
    CreateBucketError(#[from] SdkError<CreateBucketError>),
    #[error("Failed to set bucket policy: {0}")]
    PutBucketPolicyError(#[from] SdkError<PutBucketPolicyError>),
    #[error("Failed to put object : {0}")]
    UnableToPutObject(#[from] SdkError<PutObjectError>),
    /// Presigning runs the `GetObject` request pipeline without sending it
    #[error("Failed to presign object download: {0}")]
    PresignError(#[from] SdkError<GetObjectError>),
    #[error("Invalid presigned URL expiry: {0}")]
    PresigningConfigError(#[from] PresigningConfigError),
    #[error("Failed to read {path}: {message}")]
    ObjectStreamError { path: String, message: String },
}
