//! Orchestration for checking out an existing branch into a new worktree.
//!
//! Unlike `create`, the branch must already exist, either locally or on the
//! `origin` remote; a remote branch gets a local counterpart first. The
//! outcome records where the branch was found.

use tracing::{info, instrument};

use crate::core::branch::{validate_branch_name, worktree_dir_name};
use crate::error::{GroveError, Result};
use crate::io::git::Backend;
use crate::outcome::{Action, CheckoutSource, LifecycleOutcome};

/// Add a worktree for an existing local or remote branch.
#[instrument(skip_all, fields(branch))]
pub fn checkout_worktree<B: Backend>(backend: &B, branch: &str) -> Result<LifecycleOutcome> {
    validate_branch_name(branch)?;
    let dir_name = worktree_dir_name(branch)?;

    let records = backend.list_worktrees()?;
    let primary = records
        .first()
        .ok_or_else(|| GroveError::backend("worktree list", "no worktrees reported"))?;

    if let Some(existing) = records
        .iter()
        .find(|r| r.branch.as_deref() == Some(branch))
    {
        return Err(GroveError::validation(format!(
            "branch '{branch}' is already checked out at {}",
            existing.path.display()
        )));
    }

    let container = primary.path.parent().ok_or_else(|| {
        GroveError::filesystem(format!(
            "primary worktree {} has no parent directory",
            primary.path.display()
        ))
    })?;
    let path = container.join(&dir_name);
    if path.exists() {
        return Err(GroveError::filesystem(format!(
            "directory {} already exists",
            path.display()
        )));
    }

    let source = if backend.branch_exists(branch)? {
        CheckoutSource::Local
    } else if backend.remote_branch_exists(branch)? {
        backend.create_branch(branch, &format!("origin/{branch}"))?;
        CheckoutSource::Remote
    } else {
        return Err(GroveError::validation(format!(
            "branch '{branch}' not found locally or on origin"
        )));
    };

    backend.add_worktree(&path, branch)?;
    info!(path = %path.display(), branch, ?source, "worktree checked out");
    Ok(LifecycleOutcome::new(Action::Checkout, path, branch).with_source(source))
}
