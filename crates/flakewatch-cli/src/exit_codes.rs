//! Process exit codes. Part of the public contract for CI scripts.

pub const SUCCESS: i32 = 0;
pub const JOB_FAILED: i32 = 1; // At least one job could not be analyzed
pub const CONFIG_ERROR: i32 = 2; // Bad config, arguments or cache directory
