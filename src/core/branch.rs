//! Branch-name validation and worktree directory-name derivation.
//!
//! The rules are a superset of git's ref-naming rules: anything that would be
//! rejected by `git check-ref-format` plus shell metacharacters, since branch
//! names end up in hook environments and directory names.

use crate::error::{GroveError, Result};

/// Characters that are invalid in a ref name or unsafe to hand to a shell.
const FORBIDDEN_CHARS: &str = "~^:?*[]\\;&|<>()$`\"'!{}#";

/// Validate a branch name against ref-naming rules.
///
/// Rejects: empty names; leading `/`, `.`, or `-`; trailing `/` or `.`; a
/// `.lock` suffix; control characters or whitespace; shell metacharacters;
/// `..`, `@{`, and doubled `/`.
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(GroveError::validation("branch name must not be empty"));
    }
    if name.starts_with('/') || name.starts_with('.') || name.starts_with('-') {
        return Err(GroveError::validation(format!(
            "branch name '{name}' must not start with '/', '.', or '-'"
        )));
    }
    if name.ends_with('/') || name.ends_with('.') {
        return Err(GroveError::validation(format!(
            "branch name '{name}' must not end with '/' or '.'"
        )));
    }
    if name.ends_with(".lock") {
        return Err(GroveError::validation(format!(
            "branch name '{name}' must not end with '.lock'"
        )));
    }
    if name.contains("..") || name.contains("@{") || name.contains("//") {
        return Err(GroveError::validation(format!(
            "branch name '{name}' must not contain '..', '@{{', or '//'"
        )));
    }
    for ch in name.chars() {
        if ch.is_control() || ch.is_whitespace() {
            return Err(GroveError::validation(format!(
                "branch name '{name}' must not contain whitespace or control characters"
            )));
        }
        if FORBIDDEN_CHARS.contains(ch) {
            return Err(GroveError::validation(format!(
                "branch name '{name}' contains forbidden character '{ch}'"
            )));
        }
    }
    Ok(())
}

/// Derive the worktree directory name for a branch: path separators become
/// dashes (`feature/login` → `feature-login`).
///
/// The result is re-checked for traversal segments so a validated branch name
/// can never escape the worktree container.
pub fn worktree_dir_name(branch: &str) -> Result<String> {
    let name = branch.replace('/', "-");
    if name.is_empty() || name == "." || name == ".." {
        return Err(GroveError::validation(format!(
            "branch '{branch}' does not map to a usable directory name"
        )));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(GroveError::validation(format!(
            "directory name '{name}' must not contain path separators"
        )));
    }
    Ok(name)
}
