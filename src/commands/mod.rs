//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod generate;
pub mod models;
pub mod utils;
pub mod verify;

// Re-export main command functions
pub use generate::{execute_generate, validate_args};
pub use models::{GenerateArgs, VerifyArgs, VerifyReport};
pub use utils::{display_format, display_version, print_trace_file};
pub use verify::{compare_trees, execute_verify};
