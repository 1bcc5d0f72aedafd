//! Pre-order traversal over a call tree.
//!
//! The iteration state lives in the iterator, not on the nodes, so any
//! number of traversals can walk the same tree at once.

use super::call_tree::CallTree;
use super::entry::{CallTreeEntry, EntryId};
use std::iter::FusedIterator;

/// Lazy pre-order walk: a node, then each child's whole subtree in call order
///
/// **Public** - returned by [`CallTree::iter`] and [`CallTree::subtree`]
#[derive(Debug, Clone)]
pub struct Traversal<'a> {
    tree: &'a CallTree,
    next: Option<EntryId>,
    // (visited node, index of the next child to descend into)
    stack: Vec<(EntryId, usize)>,
}

impl<'a> Traversal<'a> {
    pub(crate) fn new(tree: &'a CallTree, start: EntryId) -> Self {
        Self {
            tree,
            next: Some(start),
            stack: Vec::new(),
        }
    }
}

impl<'a> Iterator for Traversal<'a> {
    type Item = &'a CallTreeEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let id = self.next.take()?;
        self.stack.push((id, 0));

        while let Some((node, child_index)) = self.stack.last_mut() {
            let children = tree[*node].children();
            if let Some(&child) = children.get(*child_index) {
                *child_index += 1;
                self.next = Some(child);
                break;
            }
            self.stack.pop();
        }

        Some(&tree[id])
    }
}

impl FusedIterator for Traversal<'_> {}

impl<'a> IntoIterator for &'a CallTree {
    type Item = &'a CallTreeEntry;
    type IntoIter = Traversal<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
