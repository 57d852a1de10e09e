//! Source-hosting capability consumed by the engine.
//!
//! The engine never talks to a network directly: everything it needs from the
//! hosting platform goes through [`SourceHost`]. An in-memory implementation
//! lives in [`crate::fakes`].

use async_trait::async_trait;

use crate::domain::{CheckContext, CheckRunId, CheckRunUpdate, FileChange, NewCheckRun};
use crate::error::HostResult;

/// Source-hosting API used by the engine and the check-run reporter.
///
/// Implementations must be shareable across tasks; pull requests are
/// evaluated independently and may run concurrently.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Files changed by the pull request identified by `ctx`, with patch text.
    async fn list_changed_files(&self, ctx: &CheckContext) -> HostResult<Vec<FileChange>>;

    /// File names under the ledger directory at `git_ref` (default branch
    /// when `None`). A missing directory is an empty list, not an error.
    async fn get_ledger_entries(
        &self,
        owner: &str,
        repo: &str,
        git_ref: Option<&str>,
    ) -> HostResult<Vec<String>>;

    /// Create a check run and return its id.
    async fn create_check_run(
        &self,
        owner: &str,
        repo: &str,
        check_run: &NewCheckRun,
    ) -> HostResult<CheckRunId>;

    /// Update an existing check run.
    async fn update_check_run(
        &self,
        owner: &str,
        repo: &str,
        id: CheckRunId,
        update: &CheckRunUpdate,
    ) -> HostResult<()>;
}
