//! grove CLI: worktree lifecycle commands over a single git repository.
//!
//! The binary is the presentation layer: it parses arguments, invokes the
//! lifecycle library, triggers hook phases around the mutations, and maps the
//! error taxonomy to stable exit codes.

use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use grove::checkout::checkout_worktree;
use grove::core::classify::Classification;
use grove::core::types::HookPhase;
use grove::create::{CreateRequest, create_worktree};
use grove::error::{GroveError, Result};
use grove::exit_codes;
use grove::io::config::{GroveConfig, load_for_root};
use grove::io::git::{Backend, GitBackend};
use grove::io::hooks::{HookContext, PhaseReport, copy_files_into, hook_env, run_phase};
use grove::io::mover::CancelToken;
use grove::outcome::LifecycleOutcome;
use grove::remove::{remove_resolved, resolve_target};
use grove::safety::ensure_safe_to_remove;
use grove::setup::setup_repository;
use grove::{list, logging};

#[derive(Parser)]
#[command(
    name = "grove",
    version,
    about = "Git worktree lifecycle manager with safety-gated removal and classified hooks"
)]
struct Cli {
    /// Print outcomes as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a branch (if needed) and a worktree for it.
    Create {
        /// Branch name, e.g. `feature/login`.
        branch: String,
        /// Base branch for a newly created branch.
        #[arg(long)]
        from: Option<String>,
        /// Skip post_create hooks and copy_files.
        #[arg(long)]
        no_hooks: bool,
        /// Run hooks without risk classification.
        #[arg(long)]
        trust: bool,
    },
    /// Remove a worktree (branch, directory name, or path).
    Remove {
        target: String,
        /// Override the safety checks.
        #[arg(short, long)]
        force: bool,
        /// Skip pre_remove and post_remove hooks.
        #[arg(long)]
        no_hooks: bool,
        /// Run hooks without risk classification.
        #[arg(long)]
        trust: bool,
    },
    /// Add a worktree for an existing local or remote branch.
    Checkout {
        branch: String,
        /// Skip post_create hooks and copy_files.
        #[arg(long)]
        no_hooks: bool,
        /// Run hooks without risk classification.
        #[arg(long)]
        trust: bool,
    },
    /// Restructure a plain checkout into the directory-per-worktree layout.
    Setup {
        /// Directory name for the current checkout (defaults to the branch).
        #[arg(long)]
        name: Option<String>,
    },
    /// List active worktrees.
    List,
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => std::process::exit(exit_codes::OK),
        Err(GroveError::Cancelled) => {
            eprintln!("cancelled");
            std::process::exit(exit_codes::OK);
        }
        Err(err) => {
            eprintln!("error: {err}");
            if err.force_overridable() {
                eprintln!("hint: re-run with --force to override");
            }
            std::process::exit(match err {
                GroveError::Validation(_) => exit_codes::VALIDATION,
                e if e.force_overridable() => exit_codes::SAFETY,
                _ => exit_codes::FAILURE,
            });
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir()
        .map_err(|e| GroveError::io("determine current directory", e))?;
    let backend = GitBackend::new(&cwd);

    match &cli.command {
        Command::Create {
            branch,
            from,
            no_hooks,
            trust,
        } => {
            let (primary, config) = repo_context(&backend)?;
            let request = CreateRequest {
                branch: branch.clone(),
                base: from.clone(),
                configured_base: config.default_base.clone(),
            };
            let outcome = create_worktree(&backend, &request)?;
            if !no_hooks {
                run_create_phase(&outcome, &primary, &config, *trust)?;
            }
            emit(cli, &outcome)
        }
        Command::Checkout {
            branch,
            no_hooks,
            trust,
        } => {
            let (primary, config) = repo_context(&backend)?;
            let outcome = checkout_worktree(&backend, branch)?;
            if !no_hooks {
                run_create_phase(&outcome, &primary, &config, *trust)?;
            }
            emit(cli, &outcome)
        }
        Command::Remove {
            target,
            force,
            no_hooks,
            trust,
        } => {
            let (primary, config) = repo_context(&backend)?;
            let record = resolve_target(&backend, target)?;
            if !force {
                ensure_safe_to_remove(&backend, &record)?;
            }

            let branch = record.branch.clone().unwrap_or_else(|| "HEAD".to_string());
            if !no_hooks {
                let ctx = hook_context(&record.path, &branch, &primary, &config, *trust);
                report(&run_phase(
                    HookPhase::PreRemove,
                    &config.hooks.pre_remove,
                    &ctx,
                    &mut confirm_risky,
                ));
            }

            // Our own cwd may be inside the tree about to disappear; step out
            // first so later filesystem calls keep working.
            let cwd = std::env::current_dir()
                .map_err(|e| GroveError::io("determine current directory", e))?;
            if cwd.starts_with(&record.path) {
                std::env::set_current_dir(&primary)
                    .map_err(|e| GroveError::io("leave removed worktree", e))?;
            }
            let backend = GitBackend::new(&primary);
            let outcome = remove_resolved(&backend, &record, *force)?;

            if !no_hooks {
                let ctx = hook_context(&primary, &branch, &primary, &config, *trust);
                report(&run_phase(
                    HookPhase::PostRemove,
                    &config.hooks.post_remove,
                    &ctx,
                    &mut confirm_risky,
                ));
            }
            emit(cli, &outcome)
        }
        Command::Setup { name } => {
            let token = CancelToken::new();
            let handler_token = token.clone();
            if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
                warn!(err = %e, "could not install interrupt handler");
            }
            let outcome = setup_repository(&backend, &cwd, name.as_deref(), token)?;
            emit(cli, &outcome)
        }
        Command::List => {
            let records = list::list_worktrees(&backend)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&records)
                        .map_err(|e| GroveError::filesystem(format!("serialize listing: {e}")))?
                );
            } else {
                print!("{}", list::render(&records));
            }
            Ok(())
        }
    }
}

/// Primary worktree root and the repository's hook configuration.
fn repo_context(backend: &GitBackend) -> Result<(PathBuf, GroveConfig)> {
    let records = backend.list_worktrees()?;
    let primary = records
        .first()
        .ok_or_else(|| GroveError::backend("worktree list", "no worktrees reported"))?;
    let config = load_for_root(&primary.path)?;
    Ok((primary.path.clone(), config))
}

/// copy_files plus the post_create phase, shared by create and checkout.
fn run_create_phase(
    outcome: &LifecycleOutcome,
    primary: &Path,
    config: &GroveConfig,
    trust: bool,
) -> Result<()> {
    copy_files_into(primary, &outcome.path, &config.copy_files)?;
    let ctx = hook_context(&outcome.path, &outcome.branch, primary, config, trust);
    report(&run_phase(
        HookPhase::PostCreate,
        &config.hooks.post_create,
        &ctx,
        &mut confirm_risky,
    ));
    Ok(())
}

fn hook_context(
    workdir: &Path,
    branch: &str,
    primary: &Path,
    config: &GroveConfig,
    trust: bool,
) -> HookContext {
    let project = primary
        .parent()
        .and_then(Path::file_name)
        .or_else(|| primary.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    HookContext {
        workdir: workdir.to_path_buf(),
        env: hook_env(workdir, branch, primary, &project),
        trust: trust || config.trusted,
        interactive: std::io::stdin().is_terminal(),
    }
}

/// Ask on the terminal whether a risky hook command may run.
fn confirm_risky(classification: &Classification) -> bool {
    eprint!("run risky command '{}'? [y/N] ", classification.command);
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes")
}

/// Surface hook outcomes in the log; they never affect the exit code.
fn report(phase: &PhaseReport) {
    if let Some(blocked) = &phase.aborted {
        error!(
            phase = phase.phase.as_str(),
            command = %blocked.command,
            reason = blocked.reason.as_deref().unwrap_or("blocked"),
            "hook phase aborted"
        );
        return;
    }
    for (command, outcome) in &phase.outcomes {
        info!(phase = phase.phase.as_str(), command = %command, ?outcome, "hook outcome");
    }
}

fn emit(cli: &Cli, outcome: &LifecycleOutcome) -> Result<()> {
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(outcome)
                .map_err(|e| GroveError::filesystem(format!("serialize outcome: {e}")))?
        );
    } else {
        let extra = match (outcome.created, outcome.source) {
            (Some(true), _) => " (new branch)",
            (Some(false), _) => " (existing branch)",
            (_, Some(grove::outcome::CheckoutSource::Remote)) => " (from origin)",
            _ => "",
        };
        println!(
            "{:?}: {} [{}]{extra}",
            outcome.action,
            outcome.path.display(),
            outcome.branch
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create_with_base() {
        let cli = Cli::parse_from(["grove", "create", "feature/login", "--from", "develop"]);
        match cli.command {
            Command::Create { branch, from, .. } => {
                assert_eq!(branch, "feature/login");
                assert_eq!(from.as_deref(), Some("develop"));
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn parse_remove_force() {
        let cli = Cli::parse_from(["grove", "remove", "feature/login", "-f"]);
        match cli.command {
            Command::Remove { target, force, .. } => {
                assert_eq!(target, "feature/login");
                assert!(force);
            }
            _ => panic!("expected remove"),
        }
    }

    #[test]
    fn parse_global_json_flag() {
        let cli = Cli::parse_from(["grove", "list", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Command::List));
    }
}
