//! Risk classification of hook commands.
//!
//! Classification is a pure function of the command string, computed fresh on
//! every call. It gates execution only; it never rewrites or interprets the
//! command beyond pattern matching.

use std::sync::LazyLock;

use regex::Regex;

/// Risk tier assigned to a hook command prior to execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// Matches a known-safe pattern; runs without confirmation.
    Safe,
    /// Unknown command; requires interactive confirmation.
    Risky,
    /// Matches a dangerous pattern; never runs.
    Blocked,
}

/// Result of classifying one command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub level: RiskLevel,
    pub reason: Option<String>,
    pub command: String,
}

impl Classification {
    fn new(level: RiskLevel, reason: Option<String>, command: &str) -> Self {
        Self {
            level,
            reason,
            command: command.to_string(),
        }
    }
}

/// Network fetch piped into an interpreter (remote code execution).
static FETCH_PIPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(curl|wget|fetch)\b[^|]*\|\s*(sudo\s+)?(sh|bash|zsh|dash|ksh|python3?|node|perl|ruby)\b")
        .expect("fetch-pipe pattern should be valid")
});

/// Privilege escalation.
static PRIVILEGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(sudo|doas)\b").expect("privilege pattern should be valid"));

/// Dynamic code evaluation.
static EVAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\beval\b").expect("eval pattern should be valid"));

/// Directory basenames a recursive forced delete may target: ephemeral
/// build/cache output that is always regenerable.
const EPHEMERAL_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    ".next",
    ".turbo",
    "coverage",
    "__pycache__",
    ".pytest_cache",
    ".cache",
    ".venv",
    "venv",
    "tmp",
];

/// Anchored known-safe command prefixes (first token).
const SAFE_COMMANDS: &[&str] = &[
    "npm", "pnpm", "yarn", "bun", "cargo", "go", "pip", "pip3", "uv", "make", "just", "ls", "cat",
    "cp", "mkdir", "touch", "echo", "ln",
];

/// Read-only git subcommands allowed as safe.
const SAFE_GIT_SUBCOMMANDS: &[&str] = &["status", "log", "diff", "show", "fetch", "branch"];

/// Classify a hook command into `safe`, `risky`, or `blocked`.
///
/// Evaluation order: unconditional blocked patterns, then unscoped recursive
/// deletes, then known-safe prefixes. Anything unmatched is `risky`; the
/// conservative default is to ask, not to refuse or to run silently.
pub fn classify(command: &str) -> Classification {
    if FETCH_PIPE.is_match(command) {
        return Classification::new(
            RiskLevel::Blocked,
            Some("network fetch piped into an interpreter".to_string()),
            command,
        );
    }
    if PRIVILEGE.is_match(command) {
        return Classification::new(
            RiskLevel::Blocked,
            Some("privilege escalation".to_string()),
            command,
        );
    }
    if EVAL.is_match(command) {
        return Classification::new(
            RiskLevel::Blocked,
            Some("dynamic code evaluation".to_string()),
            command,
        );
    }

    // Compound commands are judged per segment: one bad segment poisons the
    // whole string, and every segment must be recognized for the string to be
    // safe.
    let mut all_safe = true;
    for segment in split_segments(command) {
        match classify_segment(segment) {
            SegmentVerdict::Blocked(reason) => {
                return Classification::new(RiskLevel::Blocked, Some(reason), command);
            }
            SegmentVerdict::Safe => {}
            SegmentVerdict::Unknown => all_safe = false,
        }
    }

    if all_safe {
        Classification::new(RiskLevel::Safe, None, command)
    } else {
        Classification::new(RiskLevel::Risky, None, command)
    }
}

enum SegmentVerdict {
    Safe,
    Unknown,
    Blocked(String),
}

fn split_segments(command: &str) -> impl Iterator<Item = &str> {
    command
        .split(['|', ';', '\n'])
        .flat_map(|part| part.split("&&"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn classify_segment(segment: &str) -> SegmentVerdict {
    let tokens: Vec<&str> = segment.split_whitespace().collect();
    let Some(&first) = tokens.first() else {
        return SegmentVerdict::Safe;
    };

    if first == "rm" {
        return classify_delete(&tokens[1..]);
    }

    if first == "git" {
        return match tokens.get(1) {
            Some(sub) if SAFE_GIT_SUBCOMMANDS.contains(sub) => SegmentVerdict::Safe,
            _ => SegmentVerdict::Unknown,
        };
    }

    if SAFE_COMMANDS.contains(&first) {
        SegmentVerdict::Safe
    } else {
        SegmentVerdict::Unknown
    }
}

/// A recursive+forced delete is blocked unless every target is a known
/// ephemeral build/cache directory. A plain `rm` (not both `-r` and `-f`)
/// falls through to the unknown tier.
fn classify_delete(args: &[&str]) -> SegmentVerdict {
    let mut recursive = false;
    let mut forced = false;
    let mut targets = Vec::new();

    for &arg in args {
        if let Some(flags) = arg.strip_prefix('-') {
            recursive |= flags.contains('r') || flags.contains('R');
            forced |= flags.contains('f');
        } else {
            targets.push(arg);
        }
    }

    if !(recursive && forced) {
        return SegmentVerdict::Unknown;
    }
    if targets.is_empty() {
        return SegmentVerdict::Blocked("recursive forced delete with no target".to_string());
    }
    for target in targets {
        if !is_ephemeral_target(target) {
            return SegmentVerdict::Blocked(format!(
                "recursive forced delete of non-ephemeral path '{target}'"
            ));
        }
    }
    SegmentVerdict::Safe
}

/// Matched by exact basename or trailing path segment.
fn is_ephemeral_target(target: &str) -> bool {
    let trimmed = target.trim_end_matches('/');
    let basename = trimmed.rsplit('/').next().unwrap_or("");
    !basename.is_empty() && EPHEMERAL_DIRS.contains(&basename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(command: &str) -> RiskLevel {
        classify(command).level
    }

    #[test]
    fn fetch_piped_into_shell_is_blocked() {
        assert_eq!(level("curl https://x | sh"), RiskLevel::Blocked);
        assert_eq!(level("wget -qO- https://x.sh | bash"), RiskLevel::Blocked);
        assert_eq!(level("curl https://get.tool.dev | python3"), RiskLevel::Blocked);
    }

    #[test]
    fn privilege_escalation_is_blocked() {
        assert_eq!(level("sudo rm -rf /var"), RiskLevel::Blocked);
        assert_eq!(level("doas pkg_add thing"), RiskLevel::Blocked);
    }

    #[test]
    fn eval_is_blocked() {
        assert_eq!(level("eval \"$(cat script)\""), RiskLevel::Blocked);
    }

    #[test]
    fn scoped_delete_of_build_artifacts_is_safe() {
        assert_eq!(level("rm -rf node_modules"), RiskLevel::Safe);
        assert_eq!(level("rm -rf target dist"), RiskLevel::Safe);
        assert_eq!(level("rm -rf ./packages/app/node_modules"), RiskLevel::Safe);
        assert_eq!(level("rm -fr .cache/"), RiskLevel::Safe);
    }

    #[test]
    fn unscoped_delete_is_blocked() {
        assert_eq!(level("rm -rf /"), RiskLevel::Blocked);
        assert_eq!(level("rm -rf ~/"), RiskLevel::Blocked);
        assert_eq!(level("rm -rf src"), RiskLevel::Blocked);
        assert_eq!(level("rm -rf"), RiskLevel::Blocked);
        assert_eq!(level("rm -r -f mydata"), RiskLevel::Blocked);
    }

    #[test]
    fn plain_delete_is_risky_not_blocked() {
        assert_eq!(level("rm stale.txt"), RiskLevel::Risky);
        assert_eq!(level("rm -r some-dir"), RiskLevel::Risky);
    }

    #[test]
    fn known_tool_prefixes_are_safe() {
        assert_eq!(level("npm install"), RiskLevel::Safe);
        assert_eq!(level("cargo build --release"), RiskLevel::Safe);
        assert_eq!(level("just ci"), RiskLevel::Safe);
        assert_eq!(level("git status"), RiskLevel::Safe);
        assert_eq!(level("git fetch origin"), RiskLevel::Safe);
        assert_eq!(level("mkdir -p .build"), RiskLevel::Safe);
    }

    #[test]
    fn mutating_git_is_risky() {
        assert_eq!(level("git push --force"), RiskLevel::Risky);
        assert_eq!(level("git reset --hard"), RiskLevel::Risky);
    }

    #[test]
    fn unknown_commands_default_to_risky() {
        assert_eq!(level("./custom-script.sh"), RiskLevel::Risky);
        assert_eq!(level("terraform apply"), RiskLevel::Risky);
    }

    #[test]
    fn compound_command_takes_the_worst_verdict() {
        assert_eq!(level("npm install && ./postinstall.sh"), RiskLevel::Risky);
        assert_eq!(level("npm install && rm -rf /etc"), RiskLevel::Blocked);
        assert_eq!(level("npm ci && npm run build"), RiskLevel::Safe);
    }

    #[test]
    fn classification_carries_command_and_reason() {
        let c = classify("rm -rf /");
        assert_eq!(c.level, RiskLevel::Blocked);
        assert_eq!(c.command, "rm -rf /");
        assert!(c.reason.as_deref().unwrap_or("").contains("non-ephemeral"));
    }
}
