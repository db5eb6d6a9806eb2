#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry refused a value it was handed. Asset creation and ownership transfer report every failure
    /// through this variant, whatever the underlying cause (invalid record, nonce clash, timeout).
    #[error("Registry rejected {operation}: {message}")]
    Rejected { operation: String, message: String },

    #[error("Asset {0} not found in the registry")]
    NotFound(String),

    /// Network/transport errors talking to the metadata service or the node
    #[error("Network error during {operation}: {message}")]
    Transport { operation: String, message: String },

    /// The metadata service returned an error response
    #[error("Registry API error during {operation} (status {status}): {message}")]
    Api { operation: String, status: u16, message: String },

    #[error("Failed to parse response during {operation}: {message}")]
    Parse { operation: String, message: String },

    #[error("Invalid DID: {0}")]
    InvalidDid(String),

    #[error("Signer error: {0}")]
    Signer(String),
}

impl RegistryError {
    /// Only rejections are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegistryError::Rejected { .. })
    }

    /// Get error type as a string for logging
    pub fn error_type(&self) -> &'static str {
        match self {
            RegistryError::Rejected { .. } => "rejected",
            RegistryError::NotFound(_) => "not_found",
            RegistryError::Transport { .. } => "transport_error",
            RegistryError::Api { .. } => "api_error",
            RegistryError::Parse { .. } => "parse_error",
            RegistryError::InvalidDid(_) => "invalid_did",
            RegistryError::Signer(_) => "signer_error",
        }
    }

    pub fn rejected(operation: impl Into<String>, message: impl ToString) -> Self {
        RegistryError::Rejected { operation: operation.into(), message: message.to_string() }
    }

    pub fn transport(operation: impl Into<String>, message: impl ToString) -> Self {
        RegistryError::Transport { operation: operation.into(), message: message.to_string() }
    }

    pub fn parse_error(operation: impl Into<String>, message: impl ToString) -> Self {
        RegistryError::Parse { operation: operation.into(), message: message.to_string() }
    }
}
