//! Process exit codes of the `fuzzer` binary.

pub const SUCCESS: i32 = 0;
pub const ANOMALY: i32 = 1; // --fail-on-anomaly and at least one anomalous or failed input
pub const COMMAND_NOT_FOUND: i32 = 2; // pre-flight failed or bad arguments (clap)
pub const SEED_UNREADABLE: i32 = 3;
pub const REPORT_FAILED: i32 = 4; // report could not be serialized
