//! Rule engine.
//!
//! Single pass over one pull request: fetch changed files, run the
//! behavior-change detector, consult the ledger only when a change was
//! detected, add invariant violations, and fold everything into one
//! [`CheckRunResult`]. Failures never escape: they become a `failure`
//! verdict so the check run is always completed.

use tracing::Instrument;

use crate::config::GuardConfig;
use crate::domain::{Annotation, CheckContext, CheckRunResult, Conclusion, RuleViolation, Severity};
use crate::error::GuardResult;
use crate::host::SourceHost;
use crate::ledger::has_ledger_entry;
use crate::obs::{
    check_span, emit_behavior_change, emit_check_error, emit_check_finished, emit_check_started,
    emit_ledger_lookup,
};
use crate::rules::{detect_behavior_change, detect_invariant_violations};

/// Rule id for behavior changes without a ledger entry.
pub const BEHAVIOR_CHANGE_RULE: &str = "behavior-change-requires-ledger";

const MISSING_LEDGER_MESSAGE: &str =
    "Behavior change detected but no ledger entry found. Add an entry to /praxis-ledger/";

pub const TITLE_VIOLATIONS: &str = "Praxis Guard: Violations Found";
pub const TITLE_WARNINGS: &str = "Praxis Guard: Warnings Found";
pub const TITLE_PASSED: &str = "Praxis Guard: All Checks Passed";
pub const TITLE_ERROR: &str = "Praxis Guard: Check Error";

/// Deterministic rule engine. Holds configuration only; no per-run state.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    config: GuardConfig,
}

impl RuleEngine {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Evaluate the pull request identified by `ctx`.
    pub async fn run(&self, host: &dyn SourceHost, ctx: &CheckContext) -> CheckRunResult {
        let outcome = self
            .collect_violations(host, ctx)
            .instrument(check_span(ctx))
            .await;

        match outcome {
            Ok(violations) => {
                let result = self.conclude(&violations);
                emit_check_finished(result.conclusion, violations.len());
                result
            }
            Err(e) => {
                let message = e.to_string();
                emit_check_error(&message);
                error_result(&message)
            }
        }
    }

    /// Run every rule and return the violations in report order: the ledger
    /// violation (if any) first, then invariant violations.
    pub async fn collect_violations(
        &self,
        host: &dyn SourceHost,
        ctx: &CheckContext,
    ) -> GuardResult<Vec<RuleViolation>> {
        let files = host.list_changed_files(ctx).await?;
        emit_check_started(ctx, files.len());

        let mut violations = Vec::new();

        let behavior = detect_behavior_change(&files);
        emit_behavior_change(&behavior);
        if let Some(first) = behavior.affected_files.first() {
            let found = has_ledger_entry(host, &ctx.owner, &ctx.repo, &ctx.head_sha).await?;
            emit_ledger_lookup(&ctx.head_sha, found);
            if !found {
                violations.push(
                    RuleViolation::new(BEHAVIOR_CHANGE_RULE, Severity::Error, MISSING_LEDGER_MESSAGE)
                        .at_path(first.clone())
                        .at_line(1),
                );
            }
        }

        violations.extend(detect_invariant_violations(&files, self.config.line_anchor));
        Ok(violations)
    }

    /// Fold violations into the verdict published on the check run.
    pub fn conclude(&self, violations: &[RuleViolation]) -> CheckRunResult {
        let conclusion = conclusion_for(violations);
        let title = match conclusion {
            Conclusion::Failure => TITLE_VIOLATIONS,
            Conclusion::Neutral => TITLE_WARNINGS,
            _ => TITLE_PASSED,
        };

        CheckRunResult {
            conclusion,
            title: title.to_string(),
            summary: render_summary(violations, &self.config.docs_url),
            annotations: violations
                .iter()
                .map(|v| self.annotation_for(v))
                .collect(),
        }
    }

    fn annotation_for(&self, violation: &RuleViolation) -> Annotation {
        let line = violation.line.unwrap_or(1);
        Annotation {
            path: violation
                .path
                .clone()
                .unwrap_or_else(|| self.config.fallback_annotation_path.clone()),
            start_line: line,
            end_line: line,
            annotation_level: violation.severity.annotation_level(),
            message: format!("[{}] {}", violation.rule, violation.message),
        }
    }
}

/// `failure` on any error, else `neutral` on any warning, else `success`.
pub fn conclusion_for(violations: &[RuleViolation]) -> Conclusion {
    if violations.iter().any(|v| v.severity == Severity::Error) {
        Conclusion::Failure
    } else if violations.iter().any(|v| v.severity == Severity::Warning) {
        Conclusion::Neutral
    } else {
        Conclusion::Success
    }
}

/// Verdict used when evaluation itself failed.
pub fn error_result(message: &str) -> CheckRunResult {
    CheckRunResult {
        conclusion: Conclusion::Failure,
        title: TITLE_ERROR.to_string(),
        summary: format!("Error running checks: {}", message),
        annotations: Vec::new(),
    }
}

/// Render the Markdown summary shown on the check run.
pub fn render_summary(violations: &[RuleViolation], docs_url: &str) -> String {
    if violations.is_empty() {
        return "✅ All deterministic checks passed.\n\nNo violations found.".to_string();
    }

    let count = |severity: Severity| violations.iter().filter(|v| v.severity == severity).count();

    let mut md = String::from("## Praxis Guard Check Results\n\n");
    for (severity, label) in [
        (Severity::Error, "error(s)"),
        (Severity::Warning, "warning(s)"),
        (Severity::Notice, "notice(s)"),
    ] {
        let n = count(severity);
        if n > 0 {
            md.push_str(&format!("{} **{} {}**\n", severity.icon(), n, label));
        }
    }

    md.push_str("\n### Violations\n\n");
    for v in violations {
        md.push_str(&format!(
            "- {} **{}**: {}\n",
            v.severity.icon(),
            v.rule,
            v.message
        ));
    }

    md.push_str("\n---\n");
    md.push_str(&format!(
        "📖 See [Praxis Guard Documentation]({}) for more information.\n",
        docs_url
    ));
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnnotationLevel;

    fn violation(severity: Severity) -> RuleViolation {
        RuleViolation::new("some-rule", severity, "something happened")
    }

    #[test]
    fn conclusion_follows_severity() {
        assert_eq!(conclusion_for(&[]), Conclusion::Success);
        assert_eq!(conclusion_for(&[violation(Severity::Notice)]), Conclusion::Success);
        assert_eq!(
            conclusion_for(&[violation(Severity::Notice), violation(Severity::Warning)]),
            Conclusion::Neutral
        );
        assert_eq!(
            conclusion_for(&[violation(Severity::Warning), violation(Severity::Error)]),
            Conclusion::Failure
        );
    }

    #[test]
    fn empty_summary() {
        let result = RuleEngine::default().conclude(&[]);
        assert_eq!(result.title, TITLE_PASSED);
        assert_eq!(
            result.summary,
            "✅ All deterministic checks passed.\n\nNo violations found."
        );
        assert!(result.annotations.is_empty());
    }

    #[test]
    fn summary_counts_and_lists_violations() {
        let violations = vec![
            violation(Severity::Error),
            violation(Severity::Warning),
            violation(Severity::Warning),
        ];
        let summary = render_summary(&violations, "https://docs.example/praxis");
        assert!(summary.starts_with("## Praxis Guard Check Results\n\n"));
        assert!(summary.contains("❌ **1 error(s)**\n"));
        assert!(summary.contains("⚠️ **2 warning(s)**\n"));
        assert!(!summary.contains("notice(s)"));
        assert_eq!(summary.matches("**some-rule**: something happened").count(), 3);
        assert!(summary.ends_with(
            "📖 See [Praxis Guard Documentation](https://docs.example/praxis) for more information.\n"
        ));
    }

    #[test]
    fn annotations_fall_back_to_defaults() {
        let result = RuleEngine::default().conclude(&[violation(Severity::Notice)]);
        assert_eq!(
            result.annotations,
            vec![Annotation {
                path: "README.md".to_string(),
                start_line: 1,
                end_line: 1,
                annotation_level: AnnotationLevel::Notice,
                message: "[some-rule] something happened".to_string(),
            }]
        );
    }

    #[test]
    fn annotations_keep_violation_location() {
        let v = violation(Severity::Error).at_path("src/a.ts").at_line(12);
        let result = RuleEngine::default().conclude(&[v]);
        assert_eq!(result.title, TITLE_VIOLATIONS);
        assert_eq!(result.annotations[0].path, "src/a.ts");
        assert_eq!(result.annotations[0].start_line, 12);
        assert_eq!(result.annotations[0].end_line, 12);
        assert_eq!(result.annotations[0].annotation_level, AnnotationLevel::Failure);
    }

    #[test]
    fn error_result_shape() {
        let result = error_result("boom");
        assert_eq!(result.conclusion, Conclusion::Failure);
        assert_eq!(result.title, TITLE_ERROR);
        assert_eq!(result.summary, "Error running checks: boom");
        assert!(result.annotations.is_empty());
    }
}
