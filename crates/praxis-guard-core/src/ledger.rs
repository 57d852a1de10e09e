//! Ledger lookup.
//!
//! A ledger entry is any `.md` or `.json` file under `praxis-ledger/` at the
//! revision being checked.

use tracing::debug;

use crate::error::GuardResult;
use crate::host::SourceHost;

/// Repository directory that holds ledger entries.
pub const LEDGER_DIR: &str = "praxis-ledger";

/// Whether a file name under the ledger directory counts as an entry.
pub fn is_ledger_entry(name: &str) -> bool {
    name.ends_with(".md") || name.ends_with(".json")
}

/// Whether at least one ledger entry exists at `sha`.
pub async fn has_ledger_entry(
    host: &dyn SourceHost,
    owner: &str,
    repo: &str,
    sha: &str,
) -> GuardResult<bool> {
    let entries = host.get_ledger_entries(owner, repo, Some(sha)).await?;
    let count = entries.iter().filter(|name| is_ledger_entry(name)).count();
    debug!(owner, repo, sha, entries = entries.len(), ledger_entries = count, "ledger listing");
    Ok(count > 0)
}
