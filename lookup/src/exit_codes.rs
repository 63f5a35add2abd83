//! Stable exit codes for lookup CLI commands.

/// Command succeeded, or `lookup get` found the value.
pub const OK: i32 = 0;
/// Invalid arguments, config or content tree.
pub const INVALID: i32 = 1;
/// `lookup get` came up empty and printed the default.
pub const DEFAULTED: i32 = 2;
/// `lookup get` hit a fault (e.g. login failure) and printed the error fallback.
pub const RECOVERED: i32 = 3;
