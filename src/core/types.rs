//! Shared deterministic types for the lifecycle core.
//!
//! These define stable contracts between the controller, the safety gate, and
//! the backend adapter. They carry no behavior beyond simple queries and stay
//! independent of I/O.

use std::path::PathBuf;

use serde::Serialize;

/// One active worktree as reported by the backend.
///
/// The first record returned by `list_worktrees` is always the primary
/// checkout. `branch: None` means detached HEAD. No two records share a path
/// or a non-detached branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorktreeRecord {
    pub path: PathBuf,
    pub branch: Option<String>,
    pub head: String,
}

/// Working-directory status, split into the three categories the safety gate
/// inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub untracked: Vec<String>,
}

impl StatusSummary {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }

    /// Short counts line for error messages, e.g. `2 staged, 1 unstaged, 3 untracked`.
    pub fn summarize(&self) -> String {
        format!(
            "{} staged, {} unstaged, {} untracked",
            self.staged.len(),
            self.unstaged.len(),
            self.untracked.len()
        )
    }

    /// All affected paths, in category order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.staged
            .iter()
            .chain(self.unstaged.iter())
            .chain(self.untracked.iter())
            .map(String::as_str)
    }
}

/// Lifecycle phase a hook list is bound to, each with its own working
/// directory: the new worktree, the worktree being removed, or the primary
/// worktree respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    PostCreate,
    PreRemove,
    PostRemove,
}

impl HookPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            HookPhase::PostCreate => "post_create",
            HookPhase::PreRemove => "pre_remove",
            HookPhase::PostRemove => "post_remove",
        }
    }
}
