//! GitHub client configuration

use serde::{Deserialize, Serialize};

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API root, e.g. `https://api.github.com` or a GHES `/api/v3` URL
    pub api_url: String,
    /// Installation access token or personal access token
    pub token: Option<String>,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            api_url: std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            user_agent: format!("praxis-guard/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

impl GithubConfig {
    /// Create a config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific API root
    pub fn new(api_url: &str) -> Self {
        GithubConfig {
            api_url: api_url.to_string(),
            token: None,
            user_agent: format!("praxis-guard/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Set request timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// API root without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_strips_trailing_slash() {
        let config = GithubConfig::new("https://ghe.example.com/api/v3/");
        assert_eq!(config.base_url(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn builders() {
        let config = GithubConfig::new(DEFAULT_API_URL)
            .with_token("ghs_abc")
            .with_timeout_secs(5);
        assert_eq!(config.token.as_deref(), Some("ghs_abc"));
        assert_eq!(config.timeout_secs, 5);
        assert!(config.user_agent.starts_with("praxis-guard/"));
    }
}
