//! Listing of active worktrees (presentation pass-through).

use crate::core::types::WorktreeRecord;
use crate::error::Result;
use crate::io::git::Backend;

/// All active worktrees; the first record is the primary.
pub fn list_worktrees<B: Backend>(backend: &B) -> Result<Vec<WorktreeRecord>> {
    backend.list_worktrees()
}

/// Human-readable table, one worktree per line, primary marked with `*`.
pub fn render(records: &[WorktreeRecord]) -> String {
    let mut out = String::new();
    for (index, record) in records.iter().enumerate() {
        let marker = if index == 0 { '*' } else { ' ' };
        let branch = record.branch.as_deref().unwrap_or("(detached)");
        let head = record.head.get(..8).unwrap_or(&record.head);
        out.push_str(&format!(
            "{marker} {branch:<30} {head:<8} {}\n",
            record.path.display()
        ));
    }
    out
}
