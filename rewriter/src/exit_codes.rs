//! Stable exit codes for rewriter CLI commands.

/// Command succeeded; every visited file reached a non-failure state.
pub const OK: i32 = 0;
/// Invalid invocation or configuration, or a command-level error.
pub const INVALID: i32 = 1;
/// The pass ran but one or more files failed (read, encode, backup or write).
pub const FILE_FAILURES: i32 = 2;
