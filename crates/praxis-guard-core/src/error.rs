//! Error types for praxis-guard-core

use thiserror::Error;

/// Errors reported by a [`SourceHost`](crate::host::SourceHost) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Transport-level failure (connect, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The host answered with a non-success status
    #[error("host returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded
    #[error("failed to decode host response: {0}")]
    Decode(String),

    /// Requested resource does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

/// Errors raised while evaluating a pull request.
#[derive(Error, Debug)]
pub enum GuardError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for host calls.
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Result type for guard operations.
pub type GuardResult<T> = std::result::Result<T, GuardError>;
