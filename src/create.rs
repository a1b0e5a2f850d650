//! Orchestration for creating a new worktree.
//!
//! Validation happens before any backend call; the branch is created only if
//! it does not already exist, and the worktree directory is placed next to
//! the primary checkout (`<container>/<branch-dirname>`).

use tracing::{debug, info, instrument};

use crate::core::branch::{validate_branch_name, worktree_dir_name};
use crate::error::{GroveError, Result};
use crate::io::git::Backend;
use crate::outcome::{Action, LifecycleOutcome};
use crate::safety::resolve_default_branch;

/// Inputs for `create`.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub branch: String,
    /// Explicit base branch; overrides every other resolution source.
    pub base: Option<String>,
    /// Configured default base (from `.grove.toml`).
    pub configured_base: Option<String>,
}

/// Create a branch (if needed) and a worktree for it.
///
/// `created` in the outcome reflects whether the *branch* was newly made; a
/// pre-existing worktree directory is a hard failure, not a "not created"
/// signal.
#[instrument(skip_all, fields(branch = %request.branch))]
pub fn create_worktree<B: Backend>(
    backend: &B,
    request: &CreateRequest,
) -> Result<LifecycleOutcome> {
    validate_branch_name(&request.branch)?;
    let dir_name = worktree_dir_name(&request.branch)?;

    let records = backend.list_worktrees()?;
    let primary = records
        .first()
        .ok_or_else(|| GroveError::backend("worktree list", "no worktrees reported"))?;

    if let Some(existing) = records
        .iter()
        .find(|r| r.branch.as_deref() == Some(request.branch.as_str()))
    {
        return Err(GroveError::validation(format!(
            "branch '{}' is already checked out at {}",
            request.branch,
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

    let created = !backend.branch_exists(&request.branch)?;
    if created {
        let base = resolve_base(backend, request)?;
        debug!(base = %base, "creating branch from base");
        backend.create_branch(&request.branch, &base)?;
    }

    backend.add_worktree(&path, &request.branch)?;
    info!(path = %path.display(), branch = %request.branch, created, "worktree created");
    Ok(LifecycleOutcome::new(Action::Create, path, &request.branch).with_created(created))
}

/// Base branch resolution, in priority order: explicit argument → configured
/// default → remote-advertised default → local `main` → local `master` →
/// current branch. Fails only if none resolve.
fn resolve_base<B: Backend>(backend: &B, request: &CreateRequest) -> Result<String> {
    if let Some(base) = &request.base {
        return Ok(base.clone());
    }
    if let Some(base) = &request.configured_base {
        return Ok(base.clone());
    }
    if let Ok(base) = resolve_default_branch(backend) {
        return Ok(base);
    }
    backend.current_branch()
}
