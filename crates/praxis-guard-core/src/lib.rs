//! Praxis Guard Core
//!
//! Deterministic pull request policy checks:
//! - Classifies diffs as behavior-changing with line-level heuristics
//! - Requires a `praxis-ledger/` entry for behavior changes
//! - Warns on removed exported functions and types
//! - Publishes one check-run verdict per pull request event
//!
//! All hosting-platform access goes through the [`SourceHost`] trait.

pub mod classify;
pub mod config;
pub mod diff;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fakes;
pub mod host;
pub mod ledger;
pub mod obs;
pub mod reporter;
pub mod rules;
pub mod telemetry;
pub mod trace;
pub mod webhook;

pub use classify::{classify_patch, is_exempt, Heuristic, PatchClassification};
pub use config::{GuardConfig, LineAnchor};
pub use domain::{
    Annotation, AnnotationLevel, CheckContext, CheckRunId, CheckRunOutput, CheckRunResult,
    CheckRunStatus, CheckRunUpdate, Conclusion, FileChange, FileStatus, NewCheckRun,
    RuleViolation, Severity,
};
pub use engine::{conclusion_for, error_result, render_summary, RuleEngine, BEHAVIOR_CHANGE_RULE};
pub use error::{GuardError, GuardResult, HostError, HostResult};
pub use host::SourceHost;
pub use ledger::{has_ledger_entry, is_ledger_entry, LEDGER_DIR};
pub use reporter::CheckRunReporter;
pub use rules::{
    detect_behavior_change, detect_invariant_violations, BehaviorChangeResult, BehaviorFinding,
    INVARIANT_VIOLATION_RULE,
};
pub use telemetry::init_tracing;
pub use trace::{generate_trace_docs, trace_docs_for, TraceDocs, TraceKind, TraceNode};
pub use webhook::{dispatch, Dispatch, PullRequestEvent, WebhookEvent};
