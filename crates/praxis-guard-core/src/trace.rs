//! Traceability documents generated from ledger entries.
//!
//! Ledger file names follow `YYYY-MM-DD-<title>.md|json`; names containing
//! "contract" are contracts, everything else is a decision.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GuardResult;
use crate::host::SourceHost;
use crate::ledger::{is_ledger_entry, LEDGER_DIR};

static DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})(-)?").expect("valid date prefix regex"));

/// File name of the Markdown overview, relative to the output directory.
pub const OVERVIEW_FILE: &str = "TRACEABILITY.md";
/// File name of the Mermaid diagram, relative to the output directory.
pub const DIAGRAM_FILE: &str = "diagrams/decision-flow.mermaid";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Decision,
    Contract,
}

/// One ledger entry as it appears in the trace documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceNode {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`, or `unknown` when the name carries no date prefix.
    pub date: String,
    pub kind: TraceKind,
    pub path: String,
}

impl TraceNode {
    pub fn from_file_name(name: &str) -> Self {
        let id = name
            .strip_suffix(".md")
            .or_else(|| name.strip_suffix(".json"))
            .unwrap_or(name)
            .to_string();
        let (date, title) = match DATE_PREFIX.captures(&id) {
            // Only a hyphen-terminated date is stripped from the title.
            Some(caps) if caps.get(2).is_some() => {
                (caps[1].to_string(), id[caps[0].len()..].to_string())
            }
            Some(caps) => (caps[1].to_string(), id.clone()),
            None => ("unknown".to_string(), id.clone()),
        };
        let kind = if name.contains("contract") {
            TraceKind::Contract
        } else {
            TraceKind::Decision
        };

        TraceNode {
            id,
            title,
            date,
            kind,
            path: format!("{}/{}", LEDGER_DIR, name),
        }
    }
}

/// Rendered trace documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceDocs {
    pub markdown: String,
    pub mermaid: String,
}

impl TraceDocs {
    /// Write the overview and diagram under `dir`.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<()> {
        let diagram = dir.join(DIAGRAM_FILE);
        if let Some(parent) = diagram.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dir.join(OVERVIEW_FILE), &self.markdown)?;
        std::fs::write(diagram, &self.mermaid)?;
        Ok(())
    }
}

/// Build trace documents from ledger file names. Names that are not ledger
/// entries (`.gitkeep`, images) are skipped.
pub fn generate_trace_docs(names: &[String], generated_at: DateTime<Utc>) -> TraceDocs {
    let nodes: Vec<TraceNode> = names
        .iter()
        .filter(|name| is_ledger_entry(name))
        .map(|name| TraceNode::from_file_name(name))
        .collect();

    TraceDocs {
        markdown: render_overview(&nodes, generated_at),
        mermaid: render_diagram(&nodes),
    }
}

/// Fetch the ledger listing on the default branch and render it.
pub async fn trace_docs_for(
    host: &dyn SourceHost,
    owner: &str,
    repo: &str,
    generated_at: DateTime<Utc>,
) -> GuardResult<TraceDocs> {
    let names = host.get_ledger_entries(owner, repo, None).await?;
    Ok(generate_trace_docs(&names, generated_at))
}

fn render_overview(nodes: &[TraceNode], generated_at: DateTime<Utc>) -> String {
    let mut md = String::from("# Traceability Overview\n\n");
    md.push_str(&format!("Last generated: {}\n\n", generated_at.to_rfc3339()));

    let mut decisions: Vec<&TraceNode> = nodes
        .iter()
        .filter(|n| n.kind == TraceKind::Decision)
        .collect();
    let contracts: Vec<&TraceNode> = nodes
        .iter()
        .filter(|n| n.kind == TraceKind::Contract)
        .collect();

    if !decisions.is_empty() {
        decisions.sort_by(|a, b| b.date.cmp(&a.date));
        md.push_str("## Decisions\n\n");
        for node in decisions {
            md.push_str(&format!("- **{}**: [{}]({})\n", node.date, node.title, node.path));
        }
        md.push('\n');
    }

    if !contracts.is_empty() {
        md.push_str("## Contracts\n\n");
        for node in contracts {
            md.push_str(&format!("- [{}]({})\n", node.title, node.path));
        }
        md.push('\n');
    }

    md.push_str("## Diagram\n\n");
    md.push_str(&format!(
        "See [{0}]({0}) for a visual representation.\n",
        DIAGRAM_FILE
    ));
    md
}

fn render_diagram(nodes: &[TraceNode]) -> String {
    let mut sorted: Vec<&TraceNode> = nodes.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));

    let mut mermaid = String::from("graph TD\n");
    for (i, node) in sorted.iter().enumerate() {
        let label = format!("{}: {}", node.date, node.title);
        match node.kind {
            TraceKind::Decision => mermaid.push_str(&format!("  node{}{{{}}}\n", i, label)),
            TraceKind::Contract => mermaid.push_str(&format!("  node{}[{}]\n", i, label)),
        }
        if i > 0 {
            mermaid.push_str(&format!("  node{} --> node{}\n", i - 1, i));
        }
    }
    mermaid
}
