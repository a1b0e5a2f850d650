//! Sequential execution of lifecycle hook commands.
//!
//! Hooks are operator-supplied automation bound to a phase; their failures
//! are advisory. This is the one deliberate exception to propagate-on-failure:
//! a command that exits non-zero or fails to spawn is logged and the rest of
//! the phase still runs, so automation never blocks an already-committed
//! lifecycle mutation.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument, warn};

use crate::core::classify::{Classification, RiskLevel, classify};
use crate::core::types::HookPhase;
use crate::error::{GroveError, Result};

/// Execution context for one hook phase.
#[derive(Debug)]
pub struct HookContext {
    /// Working directory bound to the phase.
    pub workdir: PathBuf,
    /// Extra environment exported to every command.
    pub env: Vec<(String, String)>,
    /// Skip classification entirely (operator trusts this repository).
    pub trust: bool,
    /// Whether risky commands may be confirmed; when false they are skipped.
    pub interactive: bool,
}

/// Per-command result within a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Succeeded,
    Failed { exit_code: Option<i32> },
    SpawnFailed { message: String },
    /// Risky command skipped: declined interactively or non-interactive run.
    SkippedRisky,
}

/// Logged summary of one phase. Exposed for callers that want to render the
/// per-command outcomes; carries no error, by design.
#[derive(Debug)]
pub struct PhaseReport {
    pub phase: HookPhase,
    pub outcomes: Vec<(String, CommandOutcome)>,
    /// Set when a blocked command aborted the phase before anything ran.
    pub aborted: Option<Classification>,
}

impl PhaseReport {
    fn aborted(phase: HookPhase, classification: Classification) -> Self {
        Self {
            phase,
            outcomes: Vec::new(),
            aborted: Some(classification),
        }
    }
}

/// Build the environment extension hooks receive.
pub fn hook_env(
    worktree: &Path,
    branch: &str,
    primary_root: &Path,
    project: &str,
) -> Vec<(String, String)> {
    vec![
        (
            "GROVE_WORKTREE".to_string(),
            worktree.display().to_string(),
        ),
        ("GROVE_BRANCH".to_string(), branch.to_string()),
        ("GROVE_ROOT".to_string(), primary_root.display().to_string()),
        ("GROVE_PROJECT".to_string(), project.to_string()),
    ]
}

/// Run one phase's commands strictly in order.
///
/// Unless the context is trusted, every command is classified first: any
/// blocked command aborts the entire phase before any command runs. Risky
/// commands go through `confirm` when interactive and are skipped otherwise;
/// the skip is reported, not hidden.
#[instrument(skip_all, fields(phase = phase.as_str(), commands = commands.len()))]
pub fn run_phase(
    phase: HookPhase,
    commands: &[String],
    ctx: &HookContext,
    confirm: &mut dyn FnMut(&Classification) -> bool,
) -> PhaseReport {
    if commands.is_empty() {
        return PhaseReport {
            phase,
            outcomes: Vec::new(),
            aborted: None,
        };
    }

    let classifications: Option<Vec<Classification>> = if ctx.trust {
        None
    } else {
        let classified: Vec<Classification> = commands.iter().map(|c| classify(c)).collect();
        if let Some(blocked) = classified
            .iter()
            .find(|c| c.level == RiskLevel::Blocked)
            .cloned()
        {
            warn!(
                phase = phase.as_str(),
                command = %blocked.command,
                reason = blocked.reason.as_deref().unwrap_or("blocked"),
                "hook phase aborted: blocked command"
            );
            return PhaseReport::aborted(phase, blocked);
        }
        Some(classified)
    };

    let mut outcomes = Vec::with_capacity(commands.len());
    for (index, command) in commands.iter().enumerate() {
        if let Some(classified) = &classifications
            && classified[index].level == RiskLevel::Risky
        {
            let approved = ctx.interactive && confirm(&classified[index]);
            if !approved {
                info!(
                    phase = phase.as_str(),
                    command = %command,
                    interactive = ctx.interactive,
                    "skipping risky hook command"
                );
                outcomes.push((command.clone(), CommandOutcome::SkippedRisky));
                continue;
            }
        }

        outcomes.push((command.clone(), run_command(command, ctx)));
    }
    PhaseReport {
        phase,
        outcomes,
        aborted: None,
    }
}

/// Run one command through the platform shell so pipes and redirects behave
/// as written. No timeout is enforced; a hook that never exits blocks the
/// phase (known gap).
fn run_command(command: &str, ctx: &HookContext) -> CommandOutcome {
    debug!(command, workdir = %ctx.workdir.display(), "running hook command");
    let mut cmd = shell_command(command);
    cmd.current_dir(&ctx.workdir);
    for (key, value) in &ctx.env {
        cmd.env(key, value);
    }

    match cmd.status() {
        Ok(status) if status.success() => {
            info!(command, "hook command succeeded");
            CommandOutcome::Succeeded
        }
        Ok(status) => {
            warn!(command, exit_code = ?status.code(), "hook command failed");
            CommandOutcome::Failed {
                exit_code: status.code(),
            }
        }
        Err(e) => {
            warn!(command, err = %e, "hook command failed to spawn");
            CommandOutcome::SpawnFailed {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

/// Copy configured files from the primary worktree into a new worktree.
///
/// Missing sources are skipped with a warning; parent directories are created
/// as needed. Returns the destination paths actually written.
#[instrument(skip_all, fields(files = files.len()))]
pub fn copy_files_into(primary_root: &Path, worktree: &Path, files: &[String]) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for file in files {
        let src = primary_root.join(file);
        if !src.exists() {
            warn!(file, "copy_files source missing, skipping");
            continue;
        }
        let dest = worktree.join(file);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| GroveError::io(format!("create {}", parent.display()), e))?;
        }
        fs::copy(&src, &dest).map_err(|e| {
            GroveError::io(
                format!("copy {} to {}", src.display(), dest.display()),
                e,
            )
        })?;
        debug!(file, "copied into worktree");
        copied.push(dest);
    }
    Ok(copied)
}
