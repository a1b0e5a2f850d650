//! Orchestration for removing a worktree.
//!
//! The target may be named by branch, directory name, or path. The primary
//! worktree is never removable. Unless forced, the safety gate must pass
//! before the backend primitive is called; when forced, the override flag is
//! passed down so the backend does not itself refuse.

use std::path::Path;

use tracing::{info, instrument};

use crate::core::branch::worktree_dir_name;
use crate::core::types::WorktreeRecord;
use crate::error::{GroveError, Result};
use crate::io::git::Backend;
use crate::outcome::{Action, LifecycleOutcome};
use crate::safety::ensure_safe_to_remove;

/// Find the worktree record matching `target` (branch name, directory name,
/// or path). Matching the primary worktree is an error.
pub fn resolve_target<B: Backend>(backend: &B, target: &str) -> Result<WorktreeRecord> {
    let records = backend.list_worktrees()?;
    let (primary, rest) = records.split_first().ok_or_else(|| {
        GroveError::backend("worktree list", "no worktrees reported")
    })?;

    if matches_target(primary, target) {
        return Err(GroveError::validation(format!(
            "refusing to remove the primary worktree at {}",
            primary.path.display()
        )));
    }
    rest.iter()
        .find(|r| matches_target(r, target))
        .cloned()
        .ok_or_else(|| GroveError::filesystem(format!("no worktree matches '{target}'")))
}

fn matches_target(record: &WorktreeRecord, target: &str) -> bool {
    if record.branch.as_deref() == Some(target) {
        return true;
    }
    if let Some(branch) = &record.branch
        && worktree_dir_name(branch).is_ok_and(|d| d == target)
    {
        return true;
    }
    record.path == Path::new(target)
        || record.path.file_name().is_some_and(|n| n == target)
}

/// Remove a worktree end to end: resolve, gate (unless forced), remove.
#[instrument(skip_all, fields(target, force))]
pub fn remove_worktree<B: Backend>(
    backend: &B,
    target: &str,
    force: bool,
) -> Result<LifecycleOutcome> {
    let record = resolve_target(backend, target)?;
    if !force {
        ensure_safe_to_remove(backend, &record)?;
    }
    remove_resolved(backend, &record, force)
}

/// Backend removal of an already-resolved (and, unless forced, already
/// safety-gated) worktree record.
///
/// The controller never restores the caller's working directory; a caller
/// whose cwd was inside the removed tree must capture it beforehand and step
/// out itself.
pub fn remove_resolved<B: Backend>(
    backend: &B,
    record: &WorktreeRecord,
    force: bool,
) -> Result<LifecycleOutcome> {
    backend.remove_worktree(&record.path, force)?;
    let branch = record.branch.clone().unwrap_or_else(|| "HEAD".to_string());
    info!(path = %record.path.display(), branch = %branch, force, "worktree removed");
    Ok(LifecycleOutcome::new(
        Action::Remove,
        record.path.clone(),
        branch,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::StatusSummary;
    use crate::test_support::FakeBackend;
    use std::path::PathBuf;

    fn backend_with_feature() -> FakeBackend {
        let backend = FakeBackend::standard();
        backend.add_worktree_record("/w/feature-login", Some("feature/login"));
        backend
    }

    #[test]
    fn resolves_by_branch_directory_name_and_path() {
        let backend = backend_with_feature();
        for target in ["feature/login", "feature-login", "/w/feature-login"] {
            let record = resolve_target(&backend, target).expect("resolve");
            assert_eq!(record.path, PathBuf::from("/w/feature-login"));
        }
    }

    #[test]
    fn unknown_target_is_a_filesystem_error() {
        let backend = backend_with_feature();
        let err = resolve_target(&backend, "no-such-thing").expect_err("unknown");
        assert!(matches!(err, GroveError::FileSystem { .. }));
    }

    #[test]
    fn primary_worktree_is_never_removable() {
        let backend = backend_with_feature();
        let err = remove_worktree(&backend, "main", true).expect_err("primary");
        assert!(matches!(err, GroveError::Validation(_)));
        assert!(err.to_string().contains("primary"));
    }

    #[test]
    fn dirty_worktree_is_refused_without_force() {
        let backend = backend_with_feature();
        backend.mark_merged("feature/login");
        backend.set_status(
            "/w/feature-login",
            StatusSummary {
                staged: vec![],
                unstaged: vec!["app.js".to_string()],
                untracked: vec![],
            },
        );
        let err = remove_worktree(&backend, "feature/login", false).expect_err("dirty");
        assert!(matches!(err, GroveError::UncommittedChanges { .. }));
        assert!(
            !backend
                .calls()
                .iter()
                .any(|c| c.starts_with("remove_worktree"))
        );
    }

    #[test]
    fn unmerged_branch_is_refused_without_force() {
        let backend = backend_with_feature();
        let err = remove_worktree(&backend, "feature/login", false).expect_err("unmerged");
        assert!(matches!(err, GroveError::UnmergedBranch { .. }));
    }

    #[test]
    fn clean_merged_worktree_is_removed() {
        let backend = backend_with_feature();
        backend.mark_merged("feature/login");
        let outcome = remove_worktree(&backend, "feature/login", false).expect("remove");
        assert_eq!(outcome.path, PathBuf::from("/w/feature-login"));
        assert_eq!(outcome.branch, "feature/login");
        assert!(
            backend
                .calls()
                .iter()
                .any(|c| c == "remove_worktree /w/feature-login false")
        );
    }

    #[test]
    fn force_bypasses_both_checks_and_is_passed_down() {
        let backend = backend_with_feature();
        backend.set_status(
            "/w/feature-login",
            StatusSummary {
                staged: vec!["x".to_string()],
                unstaged: vec![],
                untracked: vec!["y".to_string()],
            },
        );
        let outcome = remove_worktree(&backend, "feature/login", true).expect("force remove");
        assert_eq!(outcome.branch, "feature/login");
        assert!(
            backend
                .calls()
                .iter()
                .any(|c| c == "remove_worktree /w/feature-login true")
        );
        // The gate never ran: no status read happened.
        assert!(!backend.calls().iter().any(|c| c.starts_with("status")));
    }
}
