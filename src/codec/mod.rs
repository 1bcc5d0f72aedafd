//! Serialization formats for call trees.
//!
//! - `text`: the human-readable, line-per-entry format
//! - `decoder`: streaming parser for the text format
//! - `escape`: argument escaping shared by both directions of the text format
//! - `binary`: bincode-based structural format used as a second source of truth

pub mod binary;
pub mod decoder;
pub mod escape;
pub mod text;

// Re-export main functions
pub use binary::{read_trees_binary, write_tree_binary, write_trees_binary, BinaryDecoder};
pub use decoder::{decode_str, TextDecoder};
pub use text::{encode, write_tree, write_trees};
