//! Behavior-change detector.
//!
//! Applies the diff classifier across a pull request's files and collects the
//! non-exempt files whose edits look like they change runtime behavior.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{
    has_control_flow_changes, has_signature_changes, has_validation_changes, is_exempt, Heuristic,
};
use crate::domain::FileChange;

/// A file attributed to the behavior-change set and the heuristic that caught it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BehaviorFinding {
    pub path: String,
    pub heuristic: Heuristic,
}

/// Aggregated behavior-change outcome for one pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BehaviorChangeResult {
    pub detected: bool,
    /// Affected paths in file-list order, each at most once.
    pub affected_files: Vec<String>,
    pub reason: Option<String>,
    pub findings: Vec<BehaviorFinding>,
}

/// First heuristic that matches, checked in control-flow, signature,
/// validation order.
fn first_match(patch: &str) -> Option<Heuristic> {
    if has_control_flow_changes(patch) {
        return Some(Heuristic::ControlFlow);
    }
    if has_signature_changes(patch) {
        return Some(Heuristic::SignatureChange);
    }
    if has_validation_changes(patch) {
        return Some(Heuristic::ValidationChange);
    }
    None
}

/// Detect behavior-changing edits across `files`.
///
/// Exempt files and files without new content (removed, renamed, ...) are
/// skipped. A file without patch text never matches.
pub fn detect_behavior_change(files: &[FileChange]) -> BehaviorChangeResult {
    let mut findings = Vec::new();

    for file in files {
        if is_exempt(&file.filename) || !file.status.has_new_content() {
            continue;
        }

        if let Some(heuristic) = first_match(file.patch_text()) {
            debug!(path = %file.filename, heuristic = %heuristic, "behavior change heuristic matched");
            findings.push(BehaviorFinding {
                path: file.filename.clone(),
                heuristic,
            });
        }
    }

    let affected_files: Vec<String> = findings.iter().map(|f| f.path.clone()).collect();
    let detected = !affected_files.is_empty();
    let reason = detected.then(|| {
        format!(
            "Detected behavior changes in {} file(s)",
            affected_files.len()
        )
    });

    BehaviorChangeResult {
        detected,
        affected_files,
        reason,
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FileStatus;

    fn modified(name: &str, patch: &str) -> FileChange {
        FileChange::new(name, FileStatus::Modified, Some(patch.to_string()))
    }

    #[test]
    fn detects_control_flow_changes() {
        let files = vec![modified(
            "src/index.ts",
            "\n@@ -10,3 +10,8 @@\n function process() {\n-  return data;\n+  if (condition) {\n+    return data;\n+  }\n+  return null;\n }\n",
        )];
        let result = detect_behavior_change(&files);
        assert!(result.detected);
        assert_eq!(result.affected_files, vec!["src/index.ts"]);
        assert_eq!(result.findings[0].heuristic, Heuristic::ControlFlow);
        assert_eq!(
            result.reason.as_deref(),
            Some("Detected behavior changes in 1 file(s)")
        );
    }

    #[test]
    fn attributes_to_first_matching_heuristic() {
        let files = vec![
            modified(
                "src/api.ts",
                "@@ -5,1 +5,1 @@\n-export function getData() {\n+export async function getData(id: string) {",
            ),
            modified("src/limits.ts", "@@ -1 +1 @@\n+const tooBig = size >= MAX;"),
        ];
        let result = detect_behavior_change(&files);
        assert_eq!(result.affected_files, vec!["src/api.ts", "src/limits.ts"]);
        assert_eq!(result.findings[0].heuristic, Heuristic::SignatureChange);
        assert_eq!(result.findings[1].heuristic, Heuristic::ValidationChange);
    }

    #[test]
    fn file_listed_once_when_every_rule_matches() {
        let files = vec![modified(
            "src/validator.ts",
            "@@ -10,0 +10,4 @@\n+function check(value) {\n+  if (value === null) {\n+    throw new Error('null');\n+  }",
        )];
        let result = detect_behavior_change(&files);
        assert_eq!(result.affected_files, vec!["src/validator.ts"]);
        assert_eq!(result.findings.len(), 1);
    }

    #[test]
    fn exempt_files_are_never_affected() {
        let patch = "@@ -1 +1,3 @@\n+if (x) {\n+  return y;\n+}";
        let files = vec![
            modified("src/index.test.ts", patch),
            modified("README.md", patch),
            modified(".github/workflows/ci.yml", patch),
            modified("src/__tests__/helpers.ts", patch),
        ];
        let result = detect_behavior_change(&files);
        assert!(!result.detected);
        assert!(result.affected_files.is_empty());
        assert!(result.reason.is_none());
    }

    #[test]
    fn removed_and_renamed_files_are_skipped() {
        let patch = "@@ -1,2 +0,0 @@\n-export function gone() {\n-  return 1;";
        let files = vec![
            FileChange::new("src/old.ts", FileStatus::Removed, Some(patch.to_string())),
            FileChange::new("src/moved.ts", FileStatus::Renamed, Some(patch.to_string())),
        ];
        assert!(!detect_behavior_change(&files).detected);
    }

    #[test]
    fn missing_patch_is_not_evidence() {
        let files = vec![FileChange::new("src/blob.bin", FileStatus::Modified, None)];
        assert!(!detect_behavior_change(&files).detected);
    }

    #[test]
    fn comment_only_patch_is_not_detected() {
        let files = vec![modified(
            "src/index.ts",
            "@@ -1,0 +1,2 @@\n+// TODO: return early if (cache) is warm\n+// check == validate later",
        )];
        assert!(!detect_behavior_change(&files).detected);
    }

    #[test]
    fn inline_block_comment_does_not_hide_a_branch() {
        let files = vec![modified(
            "src/guard.ts",
            "@@ -4,0 +4,1 @@\n+/* eslint-disable */ if (banned) return deny();",
        )];
        let result = detect_behavior_change(&files);
        assert!(result.detected);
        assert_eq!(result.affected_files, vec!["src/guard.ts"]);
    }

    #[test]
    fn added_file_is_scrutinized() {
        let files = vec![FileChange::new(
            "src/new.ts",
            FileStatus::Added,
            Some("@@ -0,0 +1,3 @@\n+while (queue.length) {\n+  drain(queue);\n+}".to_string()),
        )];
        let result = detect_behavior_change(&files);
        assert_eq!(result.affected_files, vec!["src/new.ts"]);
    }
}
