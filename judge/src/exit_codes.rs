//! Stable exit codes for the judge CLI.

/// Submission completed and every test passed.
pub const OK: i32 = 0;
/// Invalid input, configuration, or a judge-side failure.
pub const INVALID: i32 = 1;
/// Submission was judged and did not pass (failed tests, error, timeout, malformed output).
pub const FAILED: i32 = 2;
