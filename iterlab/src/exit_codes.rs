//! Stable exit codes for iterlab CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to an invalid script/config or other errors.
pub const INVALID: i32 = 1;
/// `iterlab replay` finished but the final snapshot violates invariants.
pub const VIOLATIONS: i32 = 2;
