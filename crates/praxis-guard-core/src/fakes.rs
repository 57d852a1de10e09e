//! In-memory [`SourceHost`] for tests and offline scans.
//!
//! Holds one pull request's changed files and a ledger listing per git ref,
//! and records every check-run call so tests can assert on what was
//! published.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{CheckContext, CheckRunId, CheckRunUpdate, FileChange, NewCheckRun};
use crate::error::{HostError, HostResult};
use crate::host::SourceHost;

/// A check run as recorded by [`MemorySourceHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCheckRun {
    pub id: CheckRunId,
    pub owner: String,
    pub repo: String,
    pub created: NewCheckRun,
    pub updates: Vec<CheckRunUpdate>,
}

/// In-memory source host.
#[derive(Debug, Default)]
pub struct MemorySourceHost {
    files: Mutex<Vec<FileChange>>,
    /// Ledger listings keyed by git ref; `None` is the default branch.
    ledger: Mutex<HashMap<Option<String>, Vec<String>>>,
    list_files_error: Mutex<Option<HostError>>,
    ledger_error: Mutex<Option<HostError>>,
    check_runs: Mutex<Vec<RecordedCheckRun>>,
    next_id: AtomicU64,
    ledger_calls: AtomicUsize,
}

impl MemorySourceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that reports `files` for any pull request.
    pub fn with_files(files: Vec<FileChange>) -> Self {
        let host = Self::new();
        *host.files.lock().unwrap() = files;
        host
    }

    /// Set the ledger listing returned for `git_ref`.
    pub fn set_ledger_entries(&self, git_ref: Option<&str>, entries: Vec<String>) {
        self.ledger
            .lock()
            .unwrap()
            .insert(git_ref.map(str::to_string), entries);
    }

    /// Make `list_changed_files` fail with `err`.
    pub fn fail_list_files(&self, err: HostError) {
        *self.list_files_error.lock().unwrap() = Some(err);
    }

    /// Make `get_ledger_entries` fail with `err`.
    pub fn fail_ledger(&self, err: HostError) {
        *self.ledger_error.lock().unwrap() = Some(err);
    }

    /// Number of ledger listings requested so far.
    pub fn ledger_calls(&self) -> usize {
        self.ledger_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every check run created so far.
    pub fn check_runs(&self) -> Vec<RecordedCheckRun> {
        self.check_runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceHost for MemorySourceHost {
    async fn list_changed_files(&self, _ctx: &CheckContext) -> HostResult<Vec<FileChange>> {
        if let Some(err) = self.list_files_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.files.lock().unwrap().clone())
    }

    async fn get_ledger_entries(
        &self,
        _owner: &str,
        _repo: &str,
        git_ref: Option<&str>,
    ) -> HostResult<Vec<String>> {
        self.ledger_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.ledger_error.lock().unwrap().clone() {
            return Err(err);
        }
        let ledger = self.ledger.lock().unwrap();
        Ok(ledger
            .get(&git_ref.map(str::to_string))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_check_run(
        &self,
        owner: &str,
        repo: &str,
        check_run: &NewCheckRun,
    ) -> HostResult<CheckRunId> {
        let id = CheckRunId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.check_runs.lock().unwrap().push(RecordedCheckRun {
            id,
            owner: owner.to_string(),
            repo: repo.to_string(),
            created: check_run.clone(),
            updates: Vec::new(),
        });
        Ok(id)
    }

    async fn update_check_run(
        &self,
        _owner: &str,
        _repo: &str,
        id: CheckRunId,
        update: &CheckRunUpdate,
    ) -> HostResult<()> {
        let mut runs = self.check_runs.lock().unwrap();
        let run = runs
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| HostError::NotFound(format!("check run {}", id)))?;
        run.updates.push(update.clone());
        Ok(())
    }
}
