//! Standard exit codes for CLI operations

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - any root-command execution failure
pub const ERROR: i32 = 1;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
