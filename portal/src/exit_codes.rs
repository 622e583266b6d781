//! Stable exit codes for portal CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid usage, config, or session file.
pub const INVALID: i32 = 1;
/// A fetch or every requested change failed.
pub const FAILED: i32 = 2;
/// `portal assign` applied some changes and failed others.
pub const PARTIAL: i32 = 3;
