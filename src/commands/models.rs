use crate::utils::config::{DEFAULT_APPS, DEFAULT_BINARY_PATH, DEFAULT_TEXT_PATH, DEFAULT_WORKERS};
use crate::utils::error::VerifyError;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the generate command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    /// Output path for the text trees
    pub text_path: PathBuf,

    /// Output path for the binary trees
    pub binary_path: PathBuf,

    /// Number of demo applications (one tree each)
    pub apps: usize,

    /// Worker threads in the pool
    pub workers: usize,

    /// Base seed; random when absent
    pub seed: Option<u64>,

    /// Print every tree to stdout
    pub print_trees: bool,
}

impl Default for GenerateArgs {
    fn default() -> Self {
        Self {
            text_path: PathBuf::from(DEFAULT_TEXT_PATH),
            binary_path: PathBuf::from(DEFAULT_BINARY_PATH),
            apps: DEFAULT_APPS,
            workers: DEFAULT_WORKERS,
            seed: None,
            print_trees: false,
        }
    }
}

/// Arguments for the verify command
#[derive(Debug, Clone)]
pub struct VerifyArgs {
    pub text_path: PathBuf,
    pub binary_path: PathBuf,

    /// Resolve any signature instead of only the demo methods
    pub accept_all: bool,

    /// Print the report as JSON
    pub json: bool,
}

impl Default for VerifyArgs {
    fn default() -> Self {
        Self {
            text_path: PathBuf::from(DEFAULT_TEXT_PATH),
            binary_path: PathBuf::from(DEFAULT_BINARY_PATH),
            accept_all: false,
            json: false,
        }
    }
}

/// Outcome of comparing text trees with binary trees
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub text_trees: usize,
    pub binary_trees: usize,

    /// Positions whose trees differ
    pub mismatched: Vec<usize>,

    pub passed: bool,

    /// ISO 8601 timestamp
    pub verified_at: String,
}

impl VerifyReport {
    /// One-line pass/fail message
    pub fn verdict(&self) -> &'static str {
        if self.passed {
            "well done, everything is fine"
        } else {
            "oh no, parsed and deserialized trees are different"
        }
    }

    /// Turn a failed report into an error for the process exit path
    pub fn ensure_passed(&self) -> Result<(), VerifyError> {
        if self.passed {
            Ok(())
        } else {
            Err(VerifyError::TreesDiffer(self.mismatched.clone()))
        }
    }
}
