//! Worktree lifecycle manager for a single git repository.
//!
//! grove automates the unsafe parts of a directory-per-worktree workflow:
//! branch/directory creation, safety-gated removal, first-time restructuring,
//! and operator-supplied lifecycle hooks gated by a command risk classifier.
//! The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (name validation, command
//!   classification, safety decisions). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (git subprocesses, hook execution,
//!   config files, the restructure mover). Isolated behind the
//!   [`io::git::Backend`] trait to enable scripting in tests.
//!
//! Orchestration modules ([`create`], [`remove`], [`checkout`], [`setup`],
//! [`list`]) coordinate core logic with I/O to implement CLI commands; the
//! CLI itself triggers hook phases around the lifecycle mutations.

pub mod checkout;
pub mod core;
pub mod create;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod list;
pub mod logging;
pub mod outcome;
pub mod remove;
pub mod safety;
pub mod setup;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{GroveError, Result};
