//! Invariant violation detector.
//!
//! Flags removed exported declarations as possible breaking changes. Runs on
//! every file with patch text, exempt or not.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::LineAnchor;
use crate::diff::{code_lines, LineKind, PatchLine};
use crate::domain::{FileChange, RuleViolation, Severity};

/// Rule id shared by every invariant violation.
pub const INVARIANT_VIOLATION_RULE: &str = "invariant-violation";

const API_FUNCTION_REMOVED: &str = "Public API function removed. This may be a breaking change.";
const TYPE_DEFINITION_REMOVED: &str =
    "Public type definition removed. This may be a breaking change.";

static EXPORTED_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+(async\s+)?function\s+\w+").expect("valid exported function regex")
});

static EXPORTED_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+(interface|type)\s+\w+").expect("valid exported type regex")
});

fn anchor_line(line: &PatchLine<'_>, anchor: LineAnchor) -> u32 {
    match anchor {
        LineAnchor::Patch => line.index,
        LineAnchor::File => line.head_line.unwrap_or(line.index),
    }
}

/// Scan removed lines of every patch for exported declarations.
///
/// Emits one warning per matching removed line.
pub fn detect_invariant_violations(files: &[FileChange], anchor: LineAnchor) -> Vec<RuleViolation> {
    let mut violations = Vec::new();

    for file in files {
        let Some(patch) = file.patch.as_deref() else {
            continue;
        };

        for line in code_lines(patch, LineKind::Removed) {
            let message = if EXPORTED_FUNCTION.is_match(line.content) {
                API_FUNCTION_REMOVED
            } else if EXPORTED_TYPE.is_match(line.content) {
                TYPE_DEFINITION_REMOVED
            } else {
                continue;
            };

            violations.push(
                RuleViolation::new(INVARIANT_VIOLATION_RULE, Severity::Warning, message)
                    .at_path(file.filename.clone())
                    .at_line(anchor_line(&line, anchor)),
            );
        }
    }

    violations
}
