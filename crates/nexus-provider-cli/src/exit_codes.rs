//! Process exit codes.

pub const SUCCESS: i32 = 0;
pub const DIAGNOSTIC_ERRORS: i32 = 1; // Operation reported at least one error diagnostic
pub const CONFIG_ERROR: i32 = 2; // Bad flags, unreadable input or unconfigured provider
