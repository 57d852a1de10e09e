//! GitHub source host for Praxis Guard.
//!
//! Implements [`praxis_guard_core::SourceHost`] over the GitHub REST API:
//! pull request file listings, `praxis-ledger/` directory listings and
//! check-run create/update calls. Authentication is a bearer token
//! (installation access token or personal access token).

pub mod client;
pub mod config;
pub mod error;

pub use client::{ContentEntry, GithubClient, PullRequestRefs, PER_PAGE};
pub use config::{GithubConfig, DEFAULT_API_URL};
pub use error::GithubError;

/// Result type for GitHub client operations
pub type Result<T> = std::result::Result<T, GithubError>;
