//! Diff classifier.
//!
//! Pure predicates over a file name or its patch text. Detection is substring
//! and regex matching on changed lines; false positives are accepted in
//! exchange for few false negatives.

use std::sync::LazyLock;

use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::diff::{code_lines, LineKind};

static EXEMPT_FILES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"\.test\.(ts|js|tsx|jsx)$",
        r"\.spec\.(ts|js|tsx|jsx)$",
        r"__tests__/",
        r"\.md$",
        r"\.txt$",
        r"package\.json$",
        r"tsconfig\.json$",
        r"\.eslintrc",
        r"\.gitignore$",
        r"\.yml$",
        r"\.yaml$",
        r"LICENSE$",
    ])
    .expect("valid exempt file patterns")
});

static CONTROL_FLOW: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"\bif\s*\(",
        r"\belse\b",
        r"\bswitch\s*\(",
        r"\bcase\s+",
        r"\bfor\s*\(",
        r"\bwhile\s*\(",
        r"\breturn\b",
        r"\bthrow\b",
    ])
    .expect("valid control flow patterns")
});

static SIGNATURE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"function\s+\w+\s*\(",
        r"\w+\s*:\s*\([^)]*\)\s*=>",
        r"\w+\s*=\s*\([^)]*\)\s*=>",
        r"async\s+function",
        r"export\s+(async\s+)?function",
    ])
    .expect("valid signature patterns")
});

static VALIDATION: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)\b(validate|check|require|assert|verify)",
        // == === != !== < > <= >=
        r"[<>]|[!=]=",
    ])
    .expect("valid validation patterns")
});

/// Which heuristic attributed a file to the behavior-change set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    ControlFlow,
    SignatureChange,
    ValidationChange,
}

impl Heuristic {
    pub fn as_str(self) -> &'static str {
        match self {
            Heuristic::ControlFlow => "control_flow",
            Heuristic::SignatureChange => "signature_change",
            Heuristic::ValidationChange => "validation_change",
        }
    }
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All three heuristics evaluated against one patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchClassification {
    pub has_control_flow: bool,
    pub has_signature_change: bool,
    pub has_validation_change: bool,
}

impl PatchClassification {
    pub fn any(&self) -> bool {
        self.has_control_flow || self.has_signature_change || self.has_validation_change
    }
}

/// Tests, docs and non-code config are exempt from behavior-change scrutiny.
pub fn is_exempt(filename: &str) -> bool {
    EXEMPT_FILES.is_match(filename)
}

/// Added lines introduce branching, loops, returns or throws.
pub fn has_control_flow_changes(patch: &str) -> bool {
    code_lines(patch, LineKind::Added).any(|line| CONTROL_FLOW.is_match(line.content))
}

/// A function declaration appears on an added or removed line.
pub fn has_signature_changes(patch: &str) -> bool {
    code_lines(patch, LineKind::Added)
        .chain(code_lines(patch, LineKind::Removed))
        .any(|line| SIGNATURE.is_match(line.content))
}

/// Added lines mention validation helpers or compare values.
pub fn has_validation_changes(patch: &str) -> bool {
    code_lines(patch, LineKind::Added).any(|line| VALIDATION.is_match(line.content))
}

/// Evaluate every heuristic against `patch`.
pub fn classify_patch(patch: &str) -> PatchClassification {
    PatchClassification {
        has_control_flow: has_control_flow_changes(patch),
        has_signature_change: has_signature_changes(patch),
        has_validation_change: has_validation_changes(patch),
    }
}
