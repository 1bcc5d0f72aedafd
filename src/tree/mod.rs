//! Call-tree engine.
//!
//! This module handles:
//! - The tree data model (arena of entries with parent back-indices)
//! - Scoped enter/exit tracking via [`StepGuard`]
//! - Pre-order traversal
//! - Deep equality and structural hashing
//! - Pluggable call-site resolution

pub mod call_site;
pub mod call_tree;
pub mod entry;
pub mod resolver;
pub mod traversal;

// Re-export main types
pub use call_site::{CallSite, Frame};
pub use call_tree::{CallTree, StepGuard};
pub use entry::{CallTreeEntry, EntryId};
pub use resolver::{AcceptAll, CallSiteResolver, SymbolTable};
pub use traversal::Traversal;
