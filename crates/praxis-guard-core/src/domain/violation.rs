//! Rule violations produced by the detectors.

use serde::{Deserialize, Serialize};

use super::check_run::AnnotationLevel;

/// Severity of a single violation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Notice,
}

impl Severity {
    /// Annotation level used when rendering this severity on a check run.
    pub fn annotation_level(self) -> AnnotationLevel {
        match self {
            Severity::Error => AnnotationLevel::Failure,
            Severity::Warning => AnnotationLevel::Warning,
            Severity::Notice => AnnotationLevel::Notice,
        }
    }

    /// Icon shown in front of the violation in the Markdown summary.
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Error => "❌",
            Severity::Warning => "⚠️",
            Severity::Notice => "ℹ️",
        }
    }
}

/// A single finding from a rule.
///
/// Constructed through [`RuleViolation::new`]; every detector passes a
/// non-empty rule id and message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleViolation {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// 1-based line number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl RuleViolation {
    /// Create a violation without a location.
    ///
    /// An empty `rule` or `message` trips a debug assertion; release builds
    /// keep the violation so the check run still completes.
    pub fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        let rule = rule.into();
        let message = message.into();
        debug_assert!(!rule.is_empty(), "rule violation requires a rule id");
        debug_assert!(!message.is_empty(), "rule violation requires a message");
        Self {
            rule,
            severity,
            message,
            path: None,
            line: None,
        }
    }

    /// Attach the file the violation points at.
    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach a 1-based line number.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_maps_to_annotation_level() {
        assert_eq!(Severity::Error.annotation_level(), AnnotationLevel::Failure);
        assert_eq!(Severity::Warning.annotation_level(), AnnotationLevel::Warning);
        assert_eq!(Severity::Notice.annotation_level(), AnnotationLevel::Notice);
    }

    #[test]
    fn builder_sets_location() {
        let v = RuleViolation::new("invariant-violation", Severity::Warning, "removed")
            .at_path("src/api.ts")
            .at_line(7);
        assert_eq!(v.path.as_deref(), Some("src/api.ts"));
        assert_eq!(v.line, Some(7));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "rule id")]
    fn empty_rule_is_rejected() {
        let _ = RuleViolation::new("", Severity::Notice, "message");
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn empty_message_is_kept_in_release() {
        let v = RuleViolation::new("r", Severity::Notice, "");
        assert_eq!(v.message, "");
    }

    #[test]
    fn location_is_omitted_from_json_when_absent() {
        let v = RuleViolation::new("r", Severity::Notice, "m");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "rule": "r", "severity": "notice", "message": "m" })
        );
    }
}
