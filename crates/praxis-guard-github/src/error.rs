//! Error types for praxis-guard-github

use praxis_guard_core::HostError;
use thiserror::Error;

/// Errors raised by the GitHub client
#[derive(Error, Debug)]
pub enum GithubError {
    /// No API token configured
    #[error("GitHub token is not configured (set GITHUB_TOKEN)")]
    MissingToken,

    /// Invalid configuration value
    #[error("Invalid GitHub configuration: {0}")]
    InvalidConfig(String),

    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success API response
    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode GitHub response: {0}")]
    Decode(String),

    /// 404 from the API
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GithubError::Decode(err.to_string())
        } else {
            GithubError::Http(err.to_string())
        }
    }
}

impl From<GithubError> for HostError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::Api { status, message } => HostError::Status { status, message },
            GithubError::Decode(msg) => HostError::Decode(msg),
            GithubError::NotFound(what) => HostError::NotFound(what),
            other => HostError::Http(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_maps_to_status() {
        let host: HostError = GithubError::Api {
            status: 403,
            message: "Resource not accessible by integration".to_string(),
        }
        .into();
        assert_eq!(
            host,
            HostError::Status {
                status: 403,
                message: "Resource not accessible by integration".to_string(),
            }
        );
    }

    #[test]
    fn missing_token_maps_to_http() {
        let host: HostError = GithubError::MissingToken.into();
        assert!(matches!(host, HostError::Http(msg) if msg.contains("GITHUB_TOKEN")));
    }
}
