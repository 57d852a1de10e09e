//! Changed files and the revision they are checked at.

use serde::{Deserialize, Serialize};

/// How a file was touched by the pull request.
///
/// Statuses outside the four the rules care about (`copied`, `changed`,
/// `unchanged`) deserialize to [`FileStatus::Other`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    #[serde(other)]
    Other,
}

impl FileStatus {
    /// Whether the file still has code after the change that could misbehave.
    pub fn has_new_content(self) -> bool {
        matches!(self, FileStatus::Added | FileStatus::Modified)
    }
}

/// A single file in a pull request, as reported by the source host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileChange {
    /// Repository-relative path.
    pub filename: String,

    pub status: FileStatus,

    /// Unified diff text. Absent for binary files and very large diffs.
    #[serde(default)]
    pub patch: Option<String>,

    #[serde(default)]
    pub additions: u32,

    #[serde(default)]
    pub deletions: u32,
}

impl FileChange {
    /// Create a change record with no line counts.
    pub fn new(filename: impl Into<String>, status: FileStatus, patch: Option<String>) -> Self {
        Self {
            filename: filename.into(),
            status,
            patch,
            additions: 0,
            deletions: 0,
        }
    }

    /// Patch text, or an empty string when the host sent none.
    pub fn patch_text(&self) -> &str {
        self.patch.as_deref().unwrap_or("")
    }
}

/// Identifies the pull request revision under test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckContext {
    pub installation_id: u64,
    pub owner: String,
    pub repo: String,
    pub pull_number: u64,
    pub head_sha: String,
    pub base_sha: String,
}

impl CheckContext {
    /// `owner/repo` slug.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
