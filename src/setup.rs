//! Orchestration for the first-time repository restructure.
//!
//! `setup` converts a plain checkout (`proj/`) into the directory-per-worktree
//! layout every other command assumes (`proj/<branch-dirname>/`). The move is
//! delegated to [`crate::io::mover`] and is all-or-nothing: interruption or
//! failure rolls completed moves back.

use std::path::Path;

use tracing::{info, instrument};

use crate::core::branch::worktree_dir_name;
use crate::core::safety::check_clean;
use crate::error::{GroveError, Result};
use crate::io::git::Backend;
use crate::io::mover::{CancelToken, restructure};
use crate::outcome::{Action, LifecycleOutcome};

/// Restructure the repository at `root` (the caller's working directory).
///
/// Preconditions: `root` is the toplevel of the primary checkout (not a
/// linked worktree) and the working tree is fully clean. The worktree
/// directory name defaults to the current branch; `name` overrides it.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn setup_repository<B: Backend>(
    backend: &B,
    root: &Path,
    name: Option<&str>,
    token: CancelToken,
) -> Result<LifecycleOutcome> {
    if !backend.is_primary_checkout()? {
        return Err(GroveError::validation(
            "setup must run in the primary checkout, not a linked worktree",
        ));
    }
    let toplevel = backend.toplevel()?;
    if !same_dir(root, &toplevel) {
        return Err(GroveError::validation(format!(
            "setup must run from the repository root {}",
            toplevel.display()
        )));
    }

    let status = backend.status(&toplevel)?;
    check_clean(&toplevel, &status)?;

    let branch = backend.current_branch()?;
    let dir_name = match name {
        Some(n) => worktree_dir_name(n)?,
        None => worktree_dir_name(&branch)?,
    };

    let path = restructure(&toplevel, &dir_name, token)?;
    info!(path = %path.display(), branch = %branch, "repository restructured");
    Ok(LifecycleOutcome::new(Action::Setup, path, branch))
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{StatusSummary, WorktreeRecord};
    use crate::test_support::FakeBackend;
    use std::fs;

    fn seeded_backend(root: &Path) -> FakeBackend {
        let backend = FakeBackend::with_worktrees(vec![WorktreeRecord {
            path: root.to_path_buf(),
            branch: Some("main".to_string()),
            head: "abc123".to_string(),
        }]);
        backend.set_toplevel(root);
        backend
    }

    #[test]
    fn restructures_a_clean_primary_checkout() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("README.md"), "hi").expect("write");
        fs::create_dir(temp.path().join("src")).expect("mkdir");
        let backend = seeded_backend(temp.path());

        let outcome =
            setup_repository(&backend, temp.path(), None, CancelToken::new()).expect("setup");
        assert_eq!(outcome.branch, "main");
        assert_eq!(outcome.path, temp.path().join("main"));
        assert!(outcome.path.join("README.md").exists());
        assert!(outcome.path.join("src").exists());
        assert!(!temp.path().join("README.md").exists());
    }

    #[test]
    fn explicit_name_overrides_the_branch_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("README.md"), "hi").expect("write");
        let backend = seeded_backend(temp.path());

        let outcome =
            setup_repository(&backend, temp.path(), Some("trunk"), CancelToken::new())
                .expect("setup");
        assert_eq!(outcome.path, temp.path().join("trunk"));
    }

    #[test]
    fn refuses_a_linked_worktree() {
        let temp = tempfile::tempdir().expect("tempdir");
        let backend = seeded_backend(temp.path());
        backend.set_primary_checkout(false);
        let err = setup_repository(&backend, temp.path(), None, CancelToken::new())
            .expect_err("linked");
        assert!(matches!(err, GroveError::Validation(_)));
    }

    #[test]
    fn refuses_when_not_at_the_repository_root() {
        let temp = tempfile::tempdir().expect("tempdir");
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).expect("mkdir");
        let backend = seeded_backend(temp.path());
        let err =
            setup_repository(&backend, &sub, None, CancelToken::new()).expect_err("not root");
        assert!(err.to_string().contains("repository root"));
    }

    #[test]
    fn refuses_a_dirty_tree() {
        let temp = tempfile::tempdir().expect("tempdir");
        let backend = seeded_backend(temp.path());
        backend.set_status(
            temp.path(),
            StatusSummary {
                staged: vec![],
                unstaged: vec![],
                untracked: vec!["junk.txt".to_string()],
            },
        );
        let err = setup_repository(&backend, temp.path(), None, CancelToken::new())
            .expect_err("dirty");
        assert!(matches!(err, GroveError::UncommittedChanges { .. }));
    }

    #[test]
    fn cancelled_setup_leaves_the_root_untouched() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("README.md"), "hi").expect("write");
        let backend = seeded_backend(temp.path());
        let token = CancelToken::new();
        token.cancel();
        let err =
            setup_repository(&backend, temp.path(), None, token).expect_err("cancelled");
        assert!(matches!(err, GroveError::Cancelled));
        assert!(temp.path().join("README.md").exists());
        assert!(!temp.path().join("main").exists());
    }
}
