//! Domain models for Praxis Guard.
//!
//! - `FileChange` / `CheckContext`: what a pull request changed and at which revision
//! - `RuleViolation`: a single finding produced by a detector
//! - `CheckRunResult`: the verdict handed to the check-run reporter

pub mod change;
pub mod check_run;
pub mod violation;

pub use change::{CheckContext, FileChange, FileStatus};
pub use check_run::{
    Annotation, AnnotationLevel, CheckRunId, CheckRunOutput, CheckRunResult, CheckRunStatus,
    CheckRunUpdate, Conclusion, NewCheckRun,
};
pub use violation::{RuleViolation, Severity};
