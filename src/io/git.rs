//! Git adapter for lifecycle operations.
//!
//! The controller enforces safety and never parses raw git output beyond the
//! narrow contract here, so we keep a small, explicit wrapper around `git`
//! subprocess calls. The [`Backend`] trait is the seam tests use to script
//! repository state without a real repository.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, instrument, warn};

use crate::core::types::{StatusSummary, WorktreeRecord};
use crate::error::{GroveError, Result};

/// Version-control primitives the lifecycle controller consumes.
///
/// Any primitive may fail with a backend error naming the attempted
/// operation. Implementations never decide policy; that stays in the
/// controller and the safety gate.
pub trait Backend {
    /// All active worktrees. The first record is the primary checkout.
    fn list_worktrees(&self) -> Result<Vec<WorktreeRecord>>;
    fn branch_exists(&self, name: &str) -> Result<bool>;
    fn remote_branch_exists(&self, name: &str) -> Result<bool>;
    fn create_branch(&self, name: &str, base: &str) -> Result<()>;
    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()>;
    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()>;
    /// Whether `branch` is fully reachable from `target`.
    fn is_ancestor(&self, branch: &str, target: &str) -> Result<bool>;
    /// Status of the worktree at `path`, untracked files included.
    fn status(&self, path: &Path) -> Result<StatusSummary>;
    /// Current branch name (errors on detached HEAD).
    fn current_branch(&self) -> Result<String>;
    /// Default branch advertised by the remote, if any.
    fn default_branch_hint(&self) -> Result<Option<String>>;
    /// Root of the checkout containing the backend's working directory.
    fn toplevel(&self) -> Result<PathBuf>;
    /// True when the working directory belongs to the primary checkout
    /// rather than a linked worktree.
    fn is_primary_checkout(&self) -> Result<bool>;
}

/// [`Backend`] implementation wrapping the `git` CLI.
#[derive(Debug, Clone)]
pub struct GitBackend {
    workdir: PathBuf,
}

impl GitBackend {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GroveError::backend(
                args.join(" "),
                stderr.trim().to_string(),
            ));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        self.run_in(&self.workdir, args)
    }

    fn run_in(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| GroveError::backend(args.join(" "), e.to_string()))
    }
}

impl Backend for GitBackend {
    #[instrument(skip_all)]
    fn list_worktrees(&self) -> Result<Vec<WorktreeRecord>> {
        let out = self.run_capture(&["worktree", "list", "--porcelain"])?;
        let records = parse_worktree_list(&out);
        debug!(count = records.len(), "listed worktrees");
        Ok(records)
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        let status = self
            .run(&[
                "show-ref",
                "--verify",
                "--quiet",
                &format!("refs/heads/{name}"),
            ])?
            .status;
        Ok(status.success())
    }

    fn remote_branch_exists(&self, name: &str) -> Result<bool> {
        let status = self
            .run(&[
                "show-ref",
                "--verify",
                "--quiet",
                &format!("refs/remotes/origin/{name}"),
            ])?
            .status;
        Ok(status.success())
    }

    #[instrument(skip_all, fields(name, base))]
    fn create_branch(&self, name: &str, base: &str) -> Result<()> {
        debug!(name, base, "creating branch");
        self.run_checked(&["branch", name, base])?;
        Ok(())
    }

    #[instrument(skip_all, fields(branch))]
    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
        let path_str = utf8_path(path)?;
        debug!(path = %path.display(), branch, "adding worktree");
        self.run_checked(&["worktree", "add", path_str, branch])?;
        Ok(())
    }

    #[instrument(skip_all, fields(force))]
    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()> {
        let path_str = utf8_path(path)?;
        debug!(path = %path.display(), force, "removing worktree");
        if force {
            self.run_checked(&["worktree", "remove", "--force", path_str])?;
        } else {
            self.run_checked(&["worktree", "remove", path_str])?;
        }
        Ok(())
    }

    fn is_ancestor(&self, branch: &str, target: &str) -> Result<bool> {
        let output = self.run(&["merge-base", "--is-ancestor", branch, target])?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(GroveError::backend(
                format!("merge-base --is-ancestor {branch} {target}"),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
        }
    }

    fn status(&self, path: &Path) -> Result<StatusSummary> {
        let args = ["status", "--porcelain=v1", "-uall"];
        let output = self.run_in(path, &args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GroveError::backend(
                args.join(" "),
                stderr.trim().to_string(),
            ));
        }
        parse_status(&String::from_utf8_lossy(&output.stdout))
    }

    #[instrument(skip_all)]
    fn current_branch(&self) -> Result<String> {
        let out = self.run_capture(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let name = out.trim().to_string();
        if name == "HEAD" {
            warn!("detached HEAD detected");
            return Err(GroveError::validation(
                "detached HEAD: check out a branch first",
            ));
        }
        debug!(branch = %name, "current branch");
        Ok(name)
    }

    fn default_branch_hint(&self) -> Result<Option<String>> {
        let output = self.run(&["symbolic-ref", "--short", "refs/remotes/origin/HEAD"])?;
        if !output.status.success() {
            return Ok(None);
        }
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(name.strip_prefix("origin/").map(str::to_string))
    }

    fn toplevel(&self) -> Result<PathBuf> {
        let out = self.run_capture(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(out.trim()))
    }

    fn is_primary_checkout(&self) -> Result<bool> {
        let out = self.run_capture(&["rev-parse", "--git-dir"])?;
        Ok(!out.trim().contains(".git/worktrees"))
    }
}

fn utf8_path(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        GroveError::filesystem(format!("path is not valid UTF-8: {}", path.display()))
    })
}

/// Parse `git worktree list --porcelain` output into records.
///
/// Blocks are separated by blank lines: a `worktree <path>` line followed by
/// `HEAD <sha>` and either `branch refs/heads/<name>` or `detached`.
fn parse_worktree_list(raw: &str) -> Vec<WorktreeRecord> {
    let mut records = Vec::new();
    let mut path: Option<PathBuf> = None;
    let mut head = String::new();
    let mut branch: Option<String> = None;

    let mut flush = |path: &mut Option<PathBuf>, head: &mut String, branch: &mut Option<String>| {
        if let Some(p) = path.take() {
            records.push(WorktreeRecord {
                path: p,
                branch: branch.take(),
                head: std::mem::take(head),
            });
        }
    };

    for line in raw.lines() {
        if line.is_empty() {
            flush(&mut path, &mut head, &mut branch);
        } else if let Some(p) = line.strip_prefix("worktree ") {
            flush(&mut path, &mut head, &mut branch);
            path = Some(PathBuf::from(p));
        } else if let Some(sha) = line.strip_prefix("HEAD ") {
            head = sha.to_string();
        } else if let Some(r) = line.strip_prefix("branch ") {
            branch = Some(r.strip_prefix("refs/heads/").unwrap_or(r).to_string());
        }
        // `detached`, `bare`, `locked`, `prunable` lines carry no fields we use.
    }
    flush(&mut path, &mut head, &mut branch);
    records
}

/// Parse `git status --porcelain=v1 -uall` into the three gate categories.
///
/// A file with both index and worktree changes (e.g. `MM`) appears in both
/// `staged` and `unstaged`.
fn parse_status(raw: &str) -> Result<StatusSummary> {
    let mut summary = StatusSummary::default();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(path) = line.strip_prefix("?? ") {
            summary.untracked.push(path.trim().to_string());
            continue;
        }
        if line.len() < 4 {
            return Err(GroveError::backend(
                "status --porcelain=v1",
                format!("unexpected porcelain line: '{line}'"),
            ));
        }
        let mut chars = line.chars();
        let x = chars.next().unwrap_or(' ');
        let y = chars.next().unwrap_or(' ');
        let mut path = line[3..].trim().to_string();
        if let Some((_, new)) = path.split_once("->") {
            path = new.trim().to_string();
        }
        if x != ' ' {
            summary.staged.push(path.clone());
        }
        if y != ' ' {
            summary.unstaged.push(path);
        }
    }
    Ok(summary)
}
