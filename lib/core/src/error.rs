use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required attribute: {0}")]
    MissingRequiredAttribute(&'static str),

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Provider '{provider}' timed out after {timeout_ms}ms")]
    ProviderTimeout { provider: String, timeout_ms: u64 },

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Failure reported by an external collaborator (extraction, search).
///
/// The engine passes these through untouched so callers see the provider's
/// own message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider}: request failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider}: unexpected status {status}")]
    Status { provider: String, status: u16 },

    #[error("{provider}: malformed response: {message}")]
    Malformed { provider: String, message: String },
}

impl ProviderError {
    pub fn request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Request {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn malformed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Malformed {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
