//! All-or-nothing directory restructuring for `setup`.
//!
//! Every top-level entry of the repository root is moved into a staging
//! directory, then the staging directory is renamed to the worktree directory
//! name. Each completed move is recorded in a ledger before the next begins,
//! so a failure or cancellation at any point rolls back exactly the moves
//! that finished. Moves are plain renames and cancellation is only observed
//! between them; no move is ever left half-completed.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, instrument, warn};

use crate::error::{GroveError, Result};

/// Name of the temporary staging directory created inside the root.
const STAGING_DIR: &str = ".grove-staging";

/// Cooperative cancellation handle, checked at each move boundary.
///
/// Passed by value into the mover; the caller keeps a clone and flips it from
/// a signal handler. There is no other shared interrupt state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoverState {
    Init,
    Moving,
    Renaming,
    RollingBack,
    Done,
}

/// State machine performing the staged move-and-rename.
struct AtomicMover {
    root: PathBuf,
    staging: PathBuf,
    target: PathBuf,
    ledger: Vec<OsString>,
    state: MoverState,
    token: CancelToken,
}

/// Move every top-level entry of `root` into `root/<target_name>`.
///
/// On any failure (including cancellation) completed moves are rolled back
/// and the original cause is propagated; rollback failures are attached as
/// secondary context, never substituted. On success no staging directory
/// remains and the new worktree directory is returned.
#[instrument(skip_all, fields(root = %root.display(), target_name))]
pub fn restructure(root: &Path, target_name: &str, token: CancelToken) -> Result<PathBuf> {
    let mut mover = AtomicMover::new(root, target_name, token)?;
    mover.run()
}

impl AtomicMover {
    fn new(root: &Path, target_name: &str, token: CancelToken) -> Result<Self> {
        let staging = root.join(STAGING_DIR);
        if staging.exists() {
            return Err(GroveError::filesystem(format!(
                "stale staging directory {} exists; remove it and retry",
                staging.display()
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
            staging,
            target: root.join(target_name),
            ledger: Vec::new(),
            state: MoverState::Init,
            token,
        })
    }

    fn run(&mut self) -> Result<PathBuf> {
        fs::create_dir(&self.staging)
            .map_err(|e| GroveError::io(format!("create {}", self.staging.display()), e))?;

        self.transition(MoverState::Moving);
        if let Err(cause) = self.move_all() {
            return Err(self.rollback(cause));
        }

        self.transition(MoverState::Renaming);
        if let Err(cause) = self.rename_staging() {
            return Err(self.rollback(cause));
        }

        self.transition(MoverState::Done);
        Ok(self.target.clone())
    }

    fn transition(&mut self, next: MoverState) {
        debug!(from = ?self.state, to = ?next, "mover state transition");
        self.state = next;
    }

    /// Top-level entries still at the root, in stable name order.
    fn pending_entries(&self) -> Result<Vec<OsString>> {
        let mut names = Vec::new();
        let entries = fs::read_dir(&self.root)
            .map_err(|e| GroveError::io(format!("read {}", self.root.display()), e))?;
        for entry in entries {
            let entry =
                entry.map_err(|e| GroveError::io(format!("read {}", self.root.display()), e))?;
            let name = entry.file_name();
            if name != STAGING_DIR {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn move_all(&mut self) -> Result<()> {
        for name in self.pending_entries()? {
            if self.token.is_cancelled() {
                debug!(moved = self.ledger.len(), "cancelled between moves");
                return Err(GroveError::Cancelled);
            }
            self.move_one(&name)?;
        }
        Ok(())
    }

    /// One ledger-backed move. The ledger entry is appended only after the
    /// rename succeeded, so every entry reflects a fully completed move.
    fn move_one(&mut self, name: &OsString) -> Result<()> {
        let from = self.root.join(name);
        let to = self.staging.join(name);
        fs::rename(&from, &to).map_err(|e| {
            GroveError::io(
                format!("move {} to {}", from.display(), to.display()),
                e,
            )
        })?;
        self.ledger.push(name.clone());
        Ok(())
    }

    fn rename_staging(&mut self) -> Result<()> {
        if self.target.exists() {
            return Err(GroveError::filesystem(format!(
                "target directory {} already exists",
                self.target.display()
            )));
        }
        fs::rename(&self.staging, &self.target).map_err(|e| {
            GroveError::io(
                format!(
                    "rename {} to {}",
                    self.staging.display(),
                    self.target.display()
                ),
                e,
            )
        })
    }

    /// Move every ledger entry back, independently; collect failures instead
    /// of stopping, then best-effort remove the staging directory.
    fn rollback(&mut self, cause: GroveError) -> GroveError {
        self.transition(MoverState::RollingBack);
        let mut failures = Vec::new();
        for name in &self.ledger {
            let from = self.staging.join(name);
            let to = self.root.join(name);
            if let Err(e) = fs::rename(&from, &to) {
                warn!(entry = %name.display(), err = %e, "rollback move failed");
                failures.push(format!("restore {}: {e}", name.display()));
            }
        }
        if let Err(e) = fs::remove_dir(&self.staging) {
            warn!(err = %e, "could not remove staging directory");
        }
        if failures.is_empty() {
            cause
        } else {
            GroveError::Restructure {
                source: Box::new(cause),
                rollback_failures: failures,
            }
        }
    }
}
