//! Check-run reporter.
//!
//! Publishes a [`CheckRunResult`] through a [`SourceHost`]: the run is created
//! `in_progress` before evaluation and completed with the verdict afterwards.

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::{
    CheckContext, CheckRunId, CheckRunOutput, CheckRunResult, CheckRunStatus, CheckRunUpdate,
    NewCheckRun,
};
use crate::error::GuardResult;
use crate::host::SourceHost;

/// Maximum annotations the host accepts per update request.
pub const MAX_ANNOTATIONS_PER_REQUEST: usize = 50;

/// Handle on a check run created for one pull request revision.
pub struct CheckRunReporter<'a> {
    host: &'a dyn SourceHost,
    owner: String,
    repo: String,
    name: String,
    id: CheckRunId,
}

impl<'a> CheckRunReporter<'a> {
    /// Create an `in_progress` check run for the head revision of `ctx`.
    pub async fn start(
        host: &'a dyn SourceHost,
        ctx: &CheckContext,
        name: &str,
    ) -> GuardResult<CheckRunReporter<'a>> {
        let request = NewCheckRun {
            name: name.to_string(),
            head_sha: ctx.head_sha.clone(),
            status: CheckRunStatus::InProgress,
            started_at: Utc::now(),
        };
        let id = host.create_check_run(&ctx.owner, &ctx.repo, &request).await?;
        info!(check_run_id = %id, repo = %ctx.full_name(), "check run created");

        Ok(CheckRunReporter {
            host,
            owner: ctx.owner.clone(),
            repo: ctx.repo.clone(),
            name: name.to_string(),
            id,
        })
    }

    pub fn id(&self) -> CheckRunId {
        self.id
    }

    /// Complete the check run with `result`.
    ///
    /// Annotations beyond [`MAX_ANNOTATIONS_PER_REQUEST`] are sent in
    /// additional output-only updates ahead of the final one.
    pub async fn complete(&self, result: &CheckRunResult) -> GuardResult<()> {
        let mut batches: Vec<_> = result
            .annotations
            .chunks(MAX_ANNOTATIONS_PER_REQUEST)
            .map(|chunk| chunk.to_vec())
            .collect();
        let last = batches.pop().unwrap_or_default();

        for batch in batches {
            debug!(check_run_id = %self.id, annotations = batch.len(), "sending annotation batch");
            let update = CheckRunUpdate {
                output: Some(CheckRunOutput {
                    title: result.title.clone(),
                    summary: result.summary.clone(),
                    annotations: batch,
                }),
                ..Default::default()
            };
            self.host
                .update_check_run(&self.owner, &self.repo, self.id, &update)
                .await?;
        }

        let update = CheckRunUpdate {
            status: Some(CheckRunStatus::Completed),
            conclusion: Some(result.conclusion),
            completed_at: Some(Utc::now()),
            output: Some(CheckRunOutput {
                title: result.title.clone(),
                summary: result.summary.clone(),
                annotations: last,
            }),
        };
        self.host
            .update_check_run(&self.owner, &self.repo, self.id, &update)
            .await?;

        info!(check_run_id = %self.id, conclusion = %result.conclusion, "check run completed");
        Ok(())
    }

    /// Change the run status, optionally replacing the summary.
    pub async fn update_status(
        &self,
        status: CheckRunStatus,
        summary: Option<&str>,
    ) -> GuardResult<()> {
        let update = CheckRunUpdate {
            status: Some(status),
            output: summary.map(|s| CheckRunOutput {
                title: self.name.clone(),
                summary: s.to_string(),
                annotations: Vec::new(),
            }),
            ..Default::default()
        };
        self.host
            .update_check_run(&self.owner, &self.repo, self.id, &update)
            .await?;
        Ok(())
    }
}
