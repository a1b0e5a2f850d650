//! Test-only helpers: a scripted [`Backend`] and a real-git repository
//! fixture.
//!
//! `FakeBackend` records every call it receives so tests can assert not just
//! on outcomes but on which primitives ran (e.g. "validation failed before
//! any backend call"). `TestRepo` drives the real `GitBackend` against a
//! throwaway repository laid out the way grove expects
//! (`<container>/main/...`).

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::core::types::{StatusSummary, WorktreeRecord};
use crate::error::Result;
use crate::io::git::Backend;

/// Scripted in-memory backend.
#[derive(Debug, Default)]
pub struct FakeBackend {
    worktrees: RefCell<Vec<WorktreeRecord>>,
    branches: RefCell<BTreeSet<String>>,
    remote_branches: RefCell<BTreeSet<String>>,
    statuses: RefCell<HashMap<PathBuf, StatusSummary>>,
    merged: RefCell<BTreeSet<String>>,
    default_hint: RefCell<Option<String>>,
    current: RefCell<String>,
    toplevel: RefCell<PathBuf>,
    primary_checkout: RefCell<bool>,
    calls: RefCell<Vec<String>>,
}

impl FakeBackend {
    /// Primary worktree at `/w/main` on branch `main`.
    pub fn standard() -> Self {
        Self::with_branch_layout("/w/main", "main")
    }

    /// Single primary worktree at `path` on `branch`.
    pub fn with_branch_layout(path: &str, branch: &str) -> Self {
        Self::with_worktrees(vec![WorktreeRecord {
            path: PathBuf::from(path),
            branch: Some(branch.to_string()),
            head: "0000000000000000000000000000000000000000".to_string(),
        }])
    }

    /// Seed explicit records; branches are derived from them and the current
    /// branch is the primary's.
    pub fn with_worktrees(records: Vec<WorktreeRecord>) -> Self {
        let backend = Self {
            primary_checkout: RefCell::new(true),
            ..Self::default()
        };
        if let Some(primary) = records.first() {
            *backend.toplevel.borrow_mut() = primary.path.clone();
            if let Some(branch) = &primary.branch {
                *backend.current.borrow_mut() = branch.clone();
            }
        }
        for record in &records {
            if let Some(branch) = &record.branch {
                backend.branches.borrow_mut().insert(branch.clone());
            }
        }
        *backend.worktrees.borrow_mut() = records;
        backend
    }

    pub fn add_branch(&self, name: &str) {
        self.branches.borrow_mut().insert(name.to_string());
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.borrow().contains(name)
    }

    pub fn add_remote_branch(&self, name: &str) {
        self.remote_branches.borrow_mut().insert(name.to_string());
    }

    pub fn add_worktree_record(&self, path: &str, branch: Option<&str>) {
        if let Some(branch) = branch {
            self.add_branch(branch);
        }
        self.worktrees.borrow_mut().push(WorktreeRecord {
            path: PathBuf::from(path),
            branch: branch.map(str::to_string),
            head: "0000000000000000000000000000000000000000".to_string(),
        });
    }

    pub fn set_status(&self, path: impl AsRef<Path>, status: StatusSummary) {
        self.statuses
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), status);
    }

    /// Mark a branch as fully merged into every target.
    pub fn mark_merged(&self, branch: &str) {
        self.merged.borrow_mut().insert(branch.to_string());
    }

    pub fn set_default_hint(&self, branch: &str) {
        *self.default_hint.borrow_mut() = Some(branch.to_string());
    }

    pub fn set_toplevel(&self, path: impl AsRef<Path>) {
        *self.toplevel.borrow_mut() = path.as_ref().to_path_buf();
    }

    pub fn set_primary_checkout(&self, primary: bool) {
        *self.primary_checkout.borrow_mut() = primary;
    }

    /// Every backend call received so far, in order, as `op arg...` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl Backend for FakeBackend {
    fn list_worktrees(&self) -> Result<Vec<WorktreeRecord>> {
        self.record("list_worktrees".to_string());
        Ok(self.worktrees.borrow().clone())
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        self.record(format!("branch_exists {name}"));
        Ok(self.branches.borrow().contains(name))
    }

    fn remote_branch_exists(&self, name: &str) -> Result<bool> {
        self.record(format!("remote_branch_exists {name}"));
        Ok(self.remote_branches.borrow().contains(name))
    }

    fn create_branch(&self, name: &str, base: &str) -> Result<()> {
        self.record(format!("create_branch {name} {base}"));
        self.branches.borrow_mut().insert(name.to_string());
        Ok(())
    }

    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
        self.record(format!("add_worktree {} {branch}", path.display()));
        self.worktrees.borrow_mut().push(WorktreeRecord {
            path: path.to_path_buf(),
            branch: Some(branch.to_string()),
            head: "1111111111111111111111111111111111111111".to_string(),
        });
        Ok(())
    }

    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()> {
        self.record(format!("remove_worktree {} {force}", path.display()));
        self.worktrees.borrow_mut().retain(|r| r.path != path);
        Ok(())
    }

    fn is_ancestor(&self, branch: &str, target: &str) -> Result<bool> {
        self.record(format!("is_ancestor {branch} {target}"));
        Ok(self.merged.borrow().contains(branch))
    }

    fn status(&self, path: &Path) -> Result<StatusSummary> {
        self.record(format!("status {}", path.display()));
        Ok(self
            .statuses
            .borrow()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }

    fn current_branch(&self) -> Result<String> {
        self.record("current_branch".to_string());
        Ok(self.current.borrow().clone())
    }

    fn default_branch_hint(&self) -> Result<Option<String>> {
        self.record("default_branch_hint".to_string());
        Ok(self.default_hint.borrow().clone())
    }

    fn toplevel(&self) -> Result<PathBuf> {
        self.record("toplevel".to_string());
        Ok(self.toplevel.borrow().clone())
    }

    fn is_primary_checkout(&self) -> Result<bool> {
        self.record("is_primary_checkout".to_string());
        Ok(*self.primary_checkout.borrow())
    }
}

/// Throwaway real repository: `<container>/main` with one initial commit on
/// branch `main`. Panics on git failures; this is test scaffolding.
#[cfg(feature = "test-support")]
pub struct TestRepo {
    _temp: tempfile::TempDir,
    container: PathBuf,
    root: PathBuf,
}

#[cfg(feature = "test-support")]
impl TestRepo {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let container = temp.path().join("proj");
        let root = container.join("main");
        std::fs::create_dir_all(&root).expect("create repo dir");

        let repo = Self {
            _temp: temp,
            container,
            root,
        };
        repo.git(&["init", "-q", "-b", "main"]);
        repo.git(&["config", "user.email", "grove@test.invalid"]);
        repo.git(&["config", "user.name", "grove test"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.commit_file("README.md", "# test repo\n");
        repo
    }

    /// Primary worktree root (`<container>/main`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all worktrees.
    pub fn container(&self) -> &Path {
        &self.container
    }

    pub fn backend(&self) -> crate::io::git::GitBackend {
        crate::io::git::GitBackend::new(&self.root)
    }

    /// Run git in the primary worktree, panicking on failure.
    pub fn git(&self, args: &[&str]) -> String {
        self.git_in(&self.root, args)
    }

    /// Run git in an arbitrary directory, panicking on failure.
    pub fn git_in(&self, dir: &Path, args: &[&str]) -> String {
        let out = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("run git");
        assert!(
            out.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8_lossy(&out.stdout).trim().to_string()
    }

    /// Write a file in the primary worktree and commit it.
    pub fn commit_file(&self, name: &str, contents: &str) {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, contents).expect("write file");
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", &format!("add {name}")]);
    }
}

#[cfg(feature = "test-support")]
impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
