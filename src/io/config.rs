//! Repository hook configuration stored at `.grove.toml` in the primary
//! worktree root.
//!
//! This file is intended to be edited by humans and must remain stable and
//! automatable. A missing file is valid and disables all automation; partial
//! presence (e.g. only `post_create`) is valid too.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GroveError, Result};

pub const CONFIG_FILE_NAME: &str = ".grove.toml";

/// Hook and automation configuration (TOML).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GroveConfig {
    /// Base branch for new worktrees when `--from` is not given.
    pub default_base: Option<String>,

    /// Skip command classification for this repository's hooks.
    pub trusted: bool,

    /// Files copied from the primary worktree into each new worktree
    /// (paths relative to the primary root).
    pub copy_files: Vec<String>,

    pub hooks: HookCommands,
}

/// Ordered command lists per lifecycle phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HookCommands {
    /// Run inside a newly created worktree.
    pub post_create: Vec<String>,
    /// Run inside a worktree about to be removed.
    pub pre_remove: Vec<String>,
    /// Run in the primary worktree after a removal.
    pub post_remove: Vec<String>,
}

impl GroveConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(base) = &self.default_base
            && base.trim().is_empty()
        {
            return Err(GroveError::validation("default_base must not be blank"));
        }
        for (phase, commands) in [
            ("post_create", &self.hooks.post_create),
            ("pre_remove", &self.hooks.pre_remove),
            ("post_remove", &self.hooks.post_remove),
        ] {
            if commands.iter().any(|c| c.trim().is_empty()) {
                return Err(GroveError::validation(format!(
                    "hooks.{phase} must not contain blank commands"
                )));
            }
        }
        if self.copy_files.iter().any(|p| p.trim().is_empty()) {
            return Err(GroveError::validation(
                "copy_files must not contain blank paths",
            ));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GroveConfig::default()`.
pub fn load_config(path: &Path) -> Result<GroveConfig> {
    if !path.exists() {
        let cfg = GroveConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| GroveError::io(format!("read {}", path.display()), e))?;
    let cfg: GroveConfig = toml::from_str(&contents)
        .map_err(|e| GroveError::validation(format!("parse {}: {e}", path.display())))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load the config that governs a repository, given its primary root.
pub fn load_for_root(primary_root: &Path) -> Result<GroveConfig> {
    load_config(&primary_root.join(CONFIG_FILE_NAME))
}
