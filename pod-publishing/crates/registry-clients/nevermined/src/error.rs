use alloy::primitives::Address;
use pod_publishing_registry_client_interface::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Credentials are missing the \"address\" field")]
    MissingAddress,

    #[error("Credentials address is not a valid account address: {0}")]
    InvalidAddress(String),

    #[error("Failed to stage key file: {0}")]
    KeyFile(#[from] std::io::Error),

    #[error("Failed to serialize credentials: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to decrypt keystore: {0}")]
    Decrypt(String),

    #[error("Keystore belongs to {actual}, credentials claim {expected}")]
    AddressMismatch { expected: Address, actual: Address },
}

/// Classify a reqwest failure the same way for every metadata service call.
pub(crate) fn from_reqwest_error(operation: &str, source: reqwest::Error) -> RegistryError {
    if source.is_decode() {
        RegistryError::parse_error(operation, source)
    } else if let Some(status) = source.status() {
        RegistryError::Api { operation: operation.to_string(), status: status.as_u16(), message: source.to_string() }
    } else if source.is_timeout() {
        RegistryError::transport(operation, "request timed out")
    } else if source.is_connect() {
        RegistryError::transport(operation, format!("connection failed: {}", source))
    } else {
        RegistryError::transport(operation, source)
    }
}
