//! Structured observability hooks for check lifecycle events.
//!
//! - A pull-request-scoped tracing span (`check_span`)
//! - Emission functions for: check started, behavior change, ledger lookup,
//!   check finished, check errored
//!
//! Events are emitted at `info!` (`warn!` for errors) with an `event` field
//! so log pipelines can filter on it.

use tracing::{info, warn};

use crate::domain::{CheckContext, Conclusion};
use crate::rules::BehaviorChangeResult;

/// Span tagged with the pull request under test.
///
/// Attach it with `tracing::Instrument` rather than entering it, so the
/// evaluation future stays `Send` across awaits.
pub fn check_span(ctx: &CheckContext) -> tracing::Span {
    tracing::info_span!(
        "praxis.check",
        repo = %ctx.full_name(),
        pull_number = ctx.pull_number,
        head_sha = %ctx.head_sha,
    )
}

/// Emit event: changed files fetched, evaluation starting.
pub fn emit_check_started(ctx: &CheckContext, file_count: usize) {
    info!(
        event = "check.started",
        repo = %ctx.full_name(),
        pull_number = ctx.pull_number,
        files = file_count,
    );
}

/// Emit event: behavior-change detector outcome.
pub fn emit_behavior_change(result: &BehaviorChangeResult) {
    info!(
        event = "check.behavior_change",
        detected = result.detected,
        affected_files = result.affected_files.len(),
    );
}

/// Emit event: ledger lookup at a revision.
pub fn emit_ledger_lookup(sha: &str, found: bool) {
    info!(event = "check.ledger_lookup", sha = %sha, found = found);
}

/// Emit event: verdict computed.
pub fn emit_check_finished(conclusion: Conclusion, violations: usize) {
    info!(
        event = "check.finished",
        conclusion = %conclusion,
        violations = violations,
    );
}

/// Emit event: evaluation aborted and converted into a failure verdict.
pub fn emit_check_error(error: &str) {
    warn!(event = "check.error", error = %error);
}
