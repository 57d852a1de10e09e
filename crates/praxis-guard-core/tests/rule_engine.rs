//! Integration tests for the rule engine over the in-memory source host.

use praxis_guard_core::engine::{TITLE_ERROR, TITLE_PASSED, TITLE_VIOLATIONS, TITLE_WARNINGS};
use praxis_guard_core::fakes::MemorySourceHost;
use praxis_guard_core::{
    AnnotationLevel, CheckContext, Conclusion, FileChange, FileStatus, GuardConfig, HostError,
    LineAnchor, RuleEngine, Severity, BEHAVIOR_CHANGE_RULE, INVARIANT_VIOLATION_RULE,
};

const IF_RETURN_PATCH: &str = "@@ -10,3 +10,8 @@
 function process() {
-  return data;
+  if (condition) {
+    return data;
+  }
+  return null;
 }";

fn ctx() -> CheckContext {
    CheckContext {
        installation_id: 123,
        owner: "test-owner".to_string(),
        repo: "test-repo".to_string(),
        pull_number: 1,
        head_sha: "abc123".to_string(),
        base_sha: "def456".to_string(),
    }
}

fn modified(name: &str, patch: &str) -> FileChange {
    FileChange::new(name, FileStatus::Modified, Some(patch.to_string()))
}

/// Test: behavior change without a ledger entry fails the check
#[tokio::test]
async fn test_behavior_change_without_ledger_fails() {
    let host = MemorySourceHost::with_files(vec![modified("src/index.ts", IF_RETURN_PATCH)]);
    let engine = RuleEngine::default();

    let violations = engine.collect_violations(&host, &ctx()).await.unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule, BEHAVIOR_CHANGE_RULE);
    assert_eq!(violations[0].severity, Severity::Error);
    assert_eq!(violations[0].path.as_deref(), Some("src/index.ts"));
    assert_eq!(violations[0].line, Some(1));

    let result = engine.run(&host, &ctx()).await;
    assert_eq!(result.conclusion, Conclusion::Failure);
    assert_eq!(result.title, TITLE_VIOLATIONS);
    assert_eq!(result.annotations.len(), 1);
    assert_eq!(result.annotations[0].annotation_level, AnnotationLevel::Failure);
    assert!(result.annotations[0]
        .message
        .starts_with("[behavior-change-requires-ledger] "));
    assert!(result.summary.contains("❌ **1 error(s)**"));
}

/// Test: the same patch passes once a ledger entry exists at the head revision
#[tokio::test]
async fn test_behavior_change_with_ledger_passes() {
    let host = MemorySourceHost::with_files(vec![modified("src/index.ts", IF_RETURN_PATCH)]);
    host.set_ledger_entries(Some("abc123"), vec!["2024-05-01-process-nulls.md".to_string()]);

    let result = RuleEngine::default().run(&host, &ctx()).await;
    assert_eq!(result.conclusion, Conclusion::Success);
    assert_eq!(result.title, TITLE_PASSED);
    assert!(result.annotations.is_empty());
}

/// Test: a ledger entry on another revision does not count
#[tokio::test]
async fn test_ledger_is_checked_at_head_sha() {
    let host = MemorySourceHost::with_files(vec![modified("src/index.ts", IF_RETURN_PATCH)]);
    host.set_ledger_entries(None, vec!["2024-05-01-process-nulls.md".to_string()]);

    let result = RuleEngine::default().run(&host, &ctx()).await;
    assert_eq!(result.conclusion, Conclusion::Failure);
}

/// Test: documentation changes never need a ledger entry
#[tokio::test]
async fn test_readme_change_passes() {
    let host = MemorySourceHost::with_files(vec![modified("README.md", IF_RETURN_PATCH)]);

    let result = RuleEngine::default().run(&host, &ctx()).await;
    assert_eq!(result.conclusion, Conclusion::Success);
    assert_eq!(
        result.summary,
        "✅ All deterministic checks passed.\n\nNo violations found."
    );
    assert_eq!(host.ledger_calls(), 0, "ledger lookup should be skipped");
}

/// Test: removing an exported async function only warns
#[tokio::test]
async fn test_removed_export_is_neutral() {
    let host = MemorySourceHost::with_files(vec![FileChange::new(
        "src/users.ts",
        FileStatus::Modified,
        Some(
            "@@ -1,3 +0,0 @@\n-export async function fetchUser(id) {\n-  return db.users.get(id);\n-}"
                .to_string(),
        ),
    )]);
    // The removal is also a signature change, so provide a ledger entry.
    host.set_ledger_entries(Some("abc123"), vec!["2024-05-01-drop-fetch-user.md".to_string()]);

    let result = RuleEngine::default().run(&host, &ctx()).await;
    assert_eq!(result.conclusion, Conclusion::Neutral);
    assert_eq!(result.title, TITLE_WARNINGS);
    assert_eq!(result.annotations.len(), 1);
    assert_eq!(result.annotations[0].annotation_level, AnnotationLevel::Warning);
    assert_eq!(result.annotations[0].path, "src/users.ts");
    assert!(result.annotations[0]
        .message
        .contains("Public API function removed"));
}

/// Test: a removed export in a deleted file warns without a ledger lookup
#[tokio::test]
async fn test_removed_file_export_warns_without_ledger_lookup() {
    let host = MemorySourceHost::with_files(vec![FileChange::new(
        "src/legacy.ts",
        FileStatus::Removed,
        Some("@@ -1,2 +0,0 @@\n-export type LegacyId = string;\n-export interface Legacy {}".to_string()),
    )]);

    let engine = RuleEngine::default();
    let violations = engine.collect_violations(&host, &ctx()).await.unwrap();
    assert_eq!(violations.len(), 2);
    assert!(violations
        .iter()
        .all(|v| v.rule == INVARIANT_VIOLATION_RULE && v.severity == Severity::Warning));
    assert_eq!(host.ledger_calls(), 0);
}

/// Test: error and warnings are reported together, error first
#[tokio::test]
async fn test_error_and_warning_are_combined() {
    let host = MemorySourceHost::with_files(vec![
        modified("src/index.ts", IF_RETURN_PATCH),
        modified("src/api.ts", "@@ -4,1 +4,0 @@\n-export interface Options {"),
    ]);

    let engine = RuleEngine::default();
    let violations = engine.collect_violations(&host, &ctx()).await.unwrap();
    let rules: Vec<&str> = violations.iter().map(|v| v.rule.as_str()).collect();
    assert_eq!(rules, vec![BEHAVIOR_CHANGE_RULE, INVARIANT_VIOLATION_RULE]);

    let result = engine.run(&host, &ctx()).await;
    assert_eq!(result.conclusion, Conclusion::Failure);
    assert!(result.summary.contains("❌ **1 error(s)**"));
    assert!(result.summary.contains("⚠️ **1 warning(s)**"));
}

/// Test: line anchoring follows configuration
#[tokio::test]
async fn test_line_anchor_configuration() {
    let patch = "@@ -30,3 +30,2 @@\n const a = 1;\n-export function removed() {}\n const b = 2;";
    let host = MemorySourceHost::with_files(vec![modified("src/api.ts", patch)]);
    host.set_ledger_entries(Some("abc123"), vec!["entry.json".to_string()]);

    let file_anchored = RuleEngine::default().run(&host, &ctx()).await;
    assert_eq!(file_anchored.annotations[0].start_line, 31);

    let patch_anchored = RuleEngine::new(GuardConfig::default().with_line_anchor(LineAnchor::Patch))
        .run(&host, &ctx())
        .await;
    assert_eq!(patch_anchored.annotations[0].start_line, 3);
}

/// Test: identical inputs yield identical results
#[tokio::test]
async fn test_engine_is_idempotent() {
    let host = MemorySourceHost::with_files(vec![
        modified("src/index.ts", IF_RETURN_PATCH),
        modified("src/api.ts", "-export function a() {}\n-export type B = number;"),
    ]);
    let engine = RuleEngine::default();

    let first = engine.run(&host, &ctx()).await;
    let second = engine.run(&host, &ctx()).await;
    assert_eq!(first, second);
}

/// Test: a failed file fetch becomes a failure verdict with the message
#[tokio::test]
async fn test_file_fetch_failure_is_reported() {
    let host = MemorySourceHost::new();
    host.fail_list_files(HostError::Status {
        status: 500,
        message: "Internal Server Error".to_string(),
    });

    let result = RuleEngine::default().run(&host, &ctx()).await;
    assert_eq!(result.conclusion, Conclusion::Failure);
    assert_eq!(result.title, TITLE_ERROR);
    assert_eq!(
        result.summary,
        "Error running checks: host returned 500: Internal Server Error"
    );
    assert!(result.annotations.is_empty());
}

/// Test: a failed ledger lookup aborts without a partial verdict
#[tokio::test]
async fn test_ledger_failure_is_reported() {
    let host = MemorySourceHost::with_files(vec![
        modified("src/index.ts", IF_RETURN_PATCH),
        modified("src/api.ts", "-export function a() {}"),
    ]);
    host.fail_ledger(HostError::Http("connection reset".to_string()));

    let result = RuleEngine::default().run(&host, &ctx()).await;
    assert_eq!(result.conclusion, Conclusion::Failure);
    assert_eq!(result.title, TITLE_ERROR);
    assert!(result.summary.contains("connection reset"));
    assert!(result.annotations.is_empty());
}

/// Test: files without patch text produce nothing
#[tokio::test]
async fn test_files_without_patch_pass() {
    let host = MemorySourceHost::with_files(vec![
        FileChange::new("assets/logo.png", FileStatus::Added, None),
        FileChange::new("src/big.ts", FileStatus::Modified, None),
    ]);

    let result = RuleEngine::default().run(&host, &ctx()).await;
    assert_eq!(result.conclusion, Conclusion::Success);
}

/// Test: code after an inline comment still needs a ledger entry
#[tokio::test]
async fn test_inline_comment_does_not_bypass_ledger() {
    let host = MemorySourceHost::with_files(vec![modified(
        "src/auth.ts",
        "@@ -12,0 +12,1 @@\n+/* eslint-disable */ if (banned) return deny();",
    )]);

    let result = RuleEngine::default().run(&host, &ctx()).await;
    assert_eq!(result.conclusion, Conclusion::Failure);
    assert_eq!(result.annotations[0].path, "src/auth.ts");
    assert_eq!(host.ledger_calls(), 1);
}
