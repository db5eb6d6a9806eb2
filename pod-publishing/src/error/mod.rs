use std::path::PathBuf;

use pod_publishing_nevermined_client::AccountError;
use pod_publishing_registry_client_interface::RegistryError;
use thiserror::Error;

use crate::collector::CollectorError;
use crate::core::client::storage::StorageError;

/// Result type for publishing operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Error types for a publishing run
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Collector error: {0}")]
    CollectorError(#[from] CollectorError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Registry error: {0}")]
    RegistryError(#[from] RegistryError),

    #[error("Account error: {0}")]
    AccountError(#[from] AccountError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Outputs directory not found: {0}")]
    MissingOutputsError(PathBuf),

    #[error("Failed to serialize asset metadata: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl PublishError {
    pub fn error_type(&self) -> &'static str {
        match self {
            PublishError::CollectorError(_) => "collector_error",
            PublishError::StorageError(_) => "storage_error",
            PublishError::RegistryError(e) => e.error_type(),
            PublishError::AccountError(_) => "account_error",
            PublishError::ConfigError(_) => "config_error",
            PublishError::MissingOutputsError(_) => "missing_outputs",
            PublishError::SerializationError(_) => "serialization_error",
        }
    }
}
