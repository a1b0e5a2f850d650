//! Removal safety gate.
//!
//! Two independent, both-must-pass checks, evaluated in a fixed order:
//! uncommitted changes first, then merge status. The ordering is policy: when
//! both conditions hold the caller sees the uncommitted-changes error. The
//! gate only reads; it never mutates repository state.

use tracing::{debug, instrument};

use crate::core::safety::{check_clean, check_merged};
use crate::core::types::WorktreeRecord;
use crate::error::{GroveError, Result};
use crate::io::git::Backend;

/// Resolve the repository's default branch: the remote's advertised default,
/// then local `main`, then local `master`.
pub fn resolve_default_branch<B: Backend>(backend: &B) -> Result<String> {
    if let Some(hint) = backend.default_branch_hint()? {
        debug!(branch = %hint, "default branch from remote hint");
        return Ok(hint);
    }
    for candidate in ["main", "master"] {
        if backend.branch_exists(candidate)? {
            return Ok(candidate.to_string());
        }
    }
    Err(GroveError::validation(
        "no default branch found (no remote hint, no 'main' or 'master')",
    ))
}

/// Evaluate whether the worktree may be removed.
///
/// Check 1: the working directory must report nothing staged, unstaged, or
/// untracked. Check 2: the branch's history must be an ancestor of the
/// default branch (skipped for detached worktrees, which have no branch to
/// merge). Both failures are force-overridable by the caller.
#[instrument(skip_all, fields(path = %record.path.display()))]
pub fn ensure_safe_to_remove<B: Backend>(backend: &B, record: &WorktreeRecord) -> Result<()> {
    let status = backend.status(&record.path)?;
    check_clean(&record.path, &status)?;

    if let Some(branch) = &record.branch {
        let target = resolve_default_branch(backend)?;
        let is_ancestor = backend.is_ancestor(branch, &target)?;
        check_merged(branch, &target, is_ancestor)?;
    }
    debug!("safety gate passed");
    Ok(())
}
