//! Pure, deterministic logic with no I/O.
//!
//! Everything here is a function of its inputs: branch-name validation,
//! hook command classification, and the dirty-worktree decision. Side effects
//! live in [`crate::io`].

pub mod branch;
pub mod classify;
pub mod safety;
pub mod types;
