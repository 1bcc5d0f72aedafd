//! Configuration and constants for the CLI and the codecs.

/// Text written for the synthetic root of every tree
pub const ENTRY_POINT_IDENT: &str = "entry_point";

/// Placeholder printed for owner, method and parameter types of an
/// entry whose call site could not be resolved
pub const UNRESOLVED_MARKER: &str = "?";

// Default output files shared by `generate` and `verify`
pub const DEFAULT_TEXT_PATH: &str = "data.txt";
pub const DEFAULT_BINARY_PATH: &str = "data.bin";

/// Version tag stored in front of every binary tree record
pub const BINARY_FORMAT_VERSION: u16 = 1;

/// Upper bound on the encoded size of one binary tree record
pub const MAX_RECORD_BYTES: u64 = 64 * 1024 * 1024;

// Demo workload shape
pub const DEFAULT_APPS: usize = 5;
pub const DEFAULT_WORKERS: usize = 3;
pub const ARGS_PER_APP: usize = 10;
pub const ARG_BLOCK_STRIDE: usize = 100;

/// Chance that a workload function returns instead of calling deeper
pub const STOP_PROBABILITY: f64 = 0.05;

/// Hard cap on workload recursion so a long random walk can't blow the stack
pub const MAX_WORKLOAD_DEPTH: usize = 512;
