//! Pure decision logic behind the removal safety gate.
//!
//! The gate itself ([`crate::safety`]) performs the backend reads; the
//! decisions here are functions of the already-fetched state so they can be
//! tested without a repository.

use std::path::Path;

use crate::core::types::StatusSummary;
use crate::error::{GroveError, Result};

/// Fail if the status reports anything staged, unstaged, or untracked.
///
/// The remove path always counts untracked files; a worktree is only
/// removable when all three categories are empty.
pub fn check_clean(path: &Path, status: &StatusSummary) -> Result<()> {
    if status.is_clean() {
        return Ok(());
    }
    Err(GroveError::UncommittedChanges {
        path: path.to_path_buf(),
        status: status.clone(),
    })
}

/// Fail unless the branch's history is fully reachable from the target
/// (default) branch.
pub fn check_merged(branch: &str, target: &str, is_ancestor: bool) -> Result<()> {
    if is_ancestor {
        return Ok(());
    }
    Err(GroveError::UnmergedBranch {
        branch: branch.to_string(),
        target: target.to_string(),
    })
}
