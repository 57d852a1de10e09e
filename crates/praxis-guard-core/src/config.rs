//! Rule engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GuardResult;

/// How invariant-violation line numbers are computed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineAnchor {
    /// 1-based offset into the patch text.
    Patch,
    /// Head-file line derived from the enclosing hunk header.
    #[default]
    File,
}

/// Settings shared by the engine, the reporter and webhook dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GuardConfig {
    /// Name of the check run shown on the pull request.
    pub check_name: String,
    /// Path used for annotations whose violation carries no file.
    pub fallback_annotation_path: String,
    /// Link rendered in the summary footer.
    pub docs_url: String,
    pub line_anchor: LineAnchor,
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfig {
            check_name: "Praxis Guard".to_string(),
            fallback_annotation_path: "README.md".to_string(),
            docs_url: "../docs/ROADMAP.md".to_string(),
            line_anchor: LineAnchor::File,
        }
    }
}

impl GuardConfig {
    /// Load a JSON config file; missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> GuardResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::GuardError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Override the line anchor.
    pub fn with_line_anchor(mut self, anchor: LineAnchor) -> Self {
        self.line_anchor = anchor;
        self
    }

    /// Override the check run name.
    pub fn with_check_name(mut self, name: &str) -> Self {
        self.check_name = name.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GuardConfig = serde_json::from_str(r#"{"line_anchor":"patch"}"#).unwrap();
        assert_eq!(config.line_anchor, LineAnchor::Patch);
        assert_eq!(config.check_name, "Praxis Guard");
        assert_eq!(config.fallback_annotation_path, "README.md");
    }

    #[test]
    fn builders_override_fields() {
        let config = GuardConfig::default()
            .with_check_name("Ledger Gate")
            .with_line_anchor(LineAnchor::Patch);
        assert_eq!(config.check_name, "Ledger Gate");
        assert_eq!(config.line_anchor, LineAnchor::Patch);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = GuardConfig::from_json_file(Path::new("/nonexistent/praxis.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/praxis.json"));
    }
}
