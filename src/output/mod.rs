//! Trace file writers and readers.
//!
//! This module handles the files on disk:
//! - Text traces (human-readable, one line per entry)
//! - Binary traces (bincode records)

pub mod binary;
pub mod text;

// Re-export main functions
pub use binary::{read_binary_file, write_binary_file};
pub use text::{read_text_file, write_text_file};
