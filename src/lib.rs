//! Call Tree Studio
//!
//! Records nested method-call activity as ordered trees, prints them in a
//! deterministic text format and rebuilds equivalent trees from that text.
//!
//! ## Getting Started
//!
//! ```ignore
//! use calltree_studio::tree::{CallSite, CallTree};
//!
//! let mut tree = CallTree::new();
//! {
//!     let mut f = tree.step_in(CallSite::new("A", "f", ["int"]), [3]);
//!     let _g = f.step_in(CallSite::new("A", "g", ["java.lang.String"]), ["hi"]);
//! }
//! print!("{}", tree);
//! ```
//!
//! The `calltree` binary generates sample traces and verifies a text trace
//! against its binary counterpart:
//!
//! ```bash
//! calltree generate
//! calltree verify
//! ```

pub mod codec;
pub mod commands;
pub mod output;
pub mod tree;
pub mod utils;
pub mod workload;
