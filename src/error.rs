//! Classified error taxonomy for lifecycle operations.
//!
//! One result type is threaded from the core to the CLI; the CLI only maps
//! variants to exit codes, it never re-catches or re-wraps. Validation and
//! safety failures are raised before any mutation has occurred.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::StatusSummary;

pub type Result<T> = std::result::Result<T, GroveError>;

#[derive(Debug, Error)]
pub enum GroveError {
    /// Malformed input, caught before any backend call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A backend primitive failed. `op` names the attempted operation.
    #[error("git {op} failed: {message}")]
    Backend { op: String, message: String },

    /// Path conflicts, missing targets, and plain I/O failures.
    #[error("{context}")]
    FileSystem {
        context: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The worktree has staged, unstaged, or untracked entries.
    #[error("worktree {} has uncommitted changes ({})", path.display(), status.summarize())]
    UncommittedChanges { path: PathBuf, status: StatusSummary },

    /// The branch history is not fully contained in the target branch.
    #[error("branch '{branch}' is not merged into '{target}'")]
    UnmergedBranch { branch: String, target: String },

    /// A restructure failed and was rolled back. The original cause is kept;
    /// rollback failures (if any) are attached as secondary context.
    #[error("restructure failed: {source}{}", format_rollback(rollback_failures))]
    Restructure {
        source: Box<GroveError>,
        rollback_failures: Vec<String>,
    },

    /// The operation was cancelled by the user. A clean no-op, not a failure.
    #[error("operation cancelled")]
    Cancelled,
}

impl GroveError {
    pub fn validation(msg: impl Into<String>) -> Self {
        GroveError::Validation(msg.into())
    }

    pub fn backend(op: impl Into<String>, message: impl Into<String>) -> Self {
        GroveError::Backend {
            op: op.into(),
            message: message.into(),
        }
    }

    pub fn filesystem(context: impl Into<String>) -> Self {
        GroveError::FileSystem {
            context: context.into(),
            source: None,
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        GroveError::FileSystem {
            context: context.into(),
            source: Some(source),
        }
    }

    /// True for safety violations that a caller may override with `--force`.
    pub fn force_overridable(&self) -> bool {
        matches!(
            self,
            GroveError::UncommittedChanges { .. } | GroveError::UnmergedBranch { .. }
        )
    }
}

fn format_rollback(failures: &[String]) -> String {
    if failures.is_empty() {
        String::new()
    } else {
        format!(" (rollback issues: {})", failures.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_variants_are_force_overridable() {
        let dirty = GroveError::UncommittedChanges {
            path: PathBuf::from("/tmp/wt"),
            status: StatusSummary::default(),
        };
        let unmerged = GroveError::UnmergedBranch {
            branch: "feature/x".to_string(),
            target: "main".to_string(),
        };
        assert!(dirty.force_overridable());
        assert!(unmerged.force_overridable());
        assert!(!GroveError::validation("bad").force_overridable());
        assert!(!GroveError::Cancelled.force_overridable());
    }

    #[test]
    fn restructure_keeps_original_cause_and_attaches_secondary() {
        let err = GroveError::Restructure {
            source: Box::new(GroveError::filesystem("target 'main' already exists")),
            rollback_failures: vec!["restore src: permission denied".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("target 'main' already exists"));
        assert!(msg.contains("rollback issues"));
    }
}
