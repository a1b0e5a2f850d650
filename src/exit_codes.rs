//! Stable exit codes for grove CLI commands.

/// Command succeeded, or the user cancelled cleanly.
pub const OK: i32 = 0;
/// Backend, filesystem, or restructure failure.
pub const FAILURE: i32 = 1;
/// Malformed input rejected before any mutation.
pub const VALIDATION: i32 = 2;
/// A safety check refused the operation; re-run with `--force` to override.
pub const SAFETY: i32 = 3;
