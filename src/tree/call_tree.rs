//! The call tree and its scoped enter/exit protocol.
//!
//! Usage:
//!
//! ```ignore
//! let mut tree = CallTree::new();
//! {
//!     let mut guard = tree.step_in(site, ["42"]);
//!     // traced code; nested calls step in through `guard`
//! } // guard dropped: stepped out
//! assert!(tree.is_balanced());
//! ```
//!
//! Iteration goes in order of execution.

use super::call_site::{CallSite, Frame};
use super::entry::{CallTreeEntry, EntryId};
use super::resolver::CallSiteResolver;
use super::traversal::Traversal;
use log::warn;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut, Index};

/// Ordered tree of recorded calls under a synthetic root
///
/// All entries live in one arena owned by the tree; the root is
/// [`EntryId::ROOT`]. A cursor tracks the innermost open call.
#[derive(Debug, Clone)]
pub struct CallTree {
    entries: Vec<CallTreeEntry>,
    current: EntryId,
}

impl CallTree {
    /// Create an empty tree: root only, cursor at root
    ///
    /// **Public** - constructor
    pub fn new() -> Self {
        Self {
            entries: vec![CallTreeEntry::root()],
            current: EntryId::ROOT,
        }
    }

    pub fn root(&self) -> &CallTreeEntry {
        &self.entries[EntryId::ROOT.index()]
    }

    /// The innermost call that was entered and not yet left
    pub fn current(&self) -> &CallTreeEntry {
        &self[self.current]
    }

    pub fn get(&self, id: EntryId) -> Option<&CallTreeEntry> {
        self.entries.get(id.index())
    }

    pub fn parent_of(&self, entry: &CallTreeEntry) -> Option<&CallTreeEntry> {
        entry.parent().and_then(|id| self.get(id))
    }

    pub fn children_of(&self, id: EntryId) -> impl Iterator<Item = &CallTreeEntry> + '_ {
        self[id].children().iter().map(move |&child| &self[child])
    }

    /// Number of entries, root included
    pub fn node_count(&self) -> usize {
        self.entries.len()
    }

    pub fn max_depth(&self) -> usize {
        self.entries.iter().map(CallTreeEntry::depth).max().unwrap_or(0)
    }

    /// True once every scope has been closed
    pub fn is_balanced(&self) -> bool {
        self.current == EntryId::ROOT
    }

    /// Enter a call: record it under the current entry and make it current
    ///
    /// **Public** - main entry point for tracing
    ///
    /// # Arguments
    /// * `call_site` - The method being called
    /// * `args` - Argument values, snapshotted with `to_string`
    ///
    /// # Returns
    /// A guard that steps back out when dropped. It derefs to the tree, so
    /// nested calls are entered through it.
    ///
    /// An argument count that disagrees with the call site's arity, or a
    /// site that is not [printable](CallSite::is_printable), is reported and
    /// recorded as an unresolved entry.
    pub fn step_in<I, A>(&mut self, call_site: CallSite, args: I) -> StepGuard<'_>
    where
        I: IntoIterator<Item = A>,
        A: ToString,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.to_string()).collect();
        let frame = if args.len() != call_site.arity() {
            warn!(
                "Call to {} recorded with {} argument(s), expected {}",
                call_site,
                args.len(),
                call_site.arity()
            );
            Frame::Unresolved
        } else if !call_site.is_printable() {
            warn!("Call site {} cannot be written as text, recorded as unresolved", call_site);
            Frame::Unresolved
        } else {
            Frame::Call(call_site)
        };
        self.enter(frame, args)
    }

    /// Enter a call identified by its owner, name and argument types
    ///
    /// **Public** - entry point for callers that only know runtime types
    ///
    /// Resolution failures never escape: they are logged and the call is
    /// recorded as [`Frame::Unresolved`] so the tree stays balanced.
    pub fn step_in_resolved<R, I, A>(
        &mut self,
        resolver: &R,
        owner_type: &str,
        method_name: &str,
        arg_types: &[Option<&str>],
        args: I,
    ) -> StepGuard<'_>
    where
        R: CallSiteResolver + ?Sized,
        I: IntoIterator<Item = A>,
        A: ToString,
    {
        match resolver.find_method(owner_type, method_name, arg_types) {
            Ok(site) => self.step_in(site, args),
            Err(e) => {
                warn!("Unable to identify caller {}.{}: {}", owner_type, method_name, e);
                let args = args.into_iter().map(|a| a.to_string()).collect();
                self.enter(Frame::Unresolved, args)
            }
        }
    }

    /// Run `body` inside a call scope
    pub fn scoped<I, A, F, T>(&mut self, call_site: CallSite, args: I, body: F) -> T
    where
        I: IntoIterator<Item = A>,
        A: ToString,
        F: FnOnce(&mut CallTree) -> T,
    {
        let mut guard = self.step_in(call_site, args);
        body(&mut guard)
    }

    /// Pre-order walk of the whole tree
    pub fn iter(&self) -> Traversal<'_> {
        Traversal::new(self, EntryId::ROOT)
    }

    /// Pre-order walk of the subtree rooted at `id`
    pub fn subtree(&self, id: EntryId) -> Traversal<'_> {
        Traversal::new(self, id)
    }

    fn enter(&mut self, frame: Frame, args: Vec<String>) -> StepGuard<'_> {
        self.current = self.attach(self.current, frame, args);
        StepGuard { tree: self }
    }

    /// Append a new last child to `parent` and return its handle
    ///
    /// **Internal** - shared by tracing and both decoders
    pub(crate) fn attach(&mut self, parent: EntryId, frame: Frame, args: Vec<String>) -> EntryId {
        let id = EntryId::new(self.entries.len());
        let child = CallTreeEntry::child_of(&self[parent], id, frame, args);
        self.entries.push(child);
        self.entries[parent.index()].push_child(id);
        id
    }

    fn step_out(&mut self) {
        let parent = self.current().parent();
        assert!(
            parent.is_some(),
            "step out imbalance: step_out called while the cursor is at the root"
        );
        if let Some(parent) = parent {
            self.current = parent;
        }
    }
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<EntryId> for CallTree {
    type Output = CallTreeEntry;

    fn index(&self, id: EntryId) -> &Self::Output {
        &self.entries[id.index()]
    }
}

/// Deep equality: roots shallow-equal, then children pairwise in order
impl PartialEq for CallTree {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(EntryId::ROOT, EntryId::ROOT)];

        while let Some((mine, theirs)) = pending.pop() {
            let (a, b) = (&self[mine], &other[theirs]);
            if a != b || a.children().len() != b.children().len() {
                return false;
            }
            pending.extend(a.children().iter().copied().zip(b.children().iter().copied()));
        }
        true
    }
}

impl Eq for CallTree {}

/// Structural hash, consistent with deep equality
impl Hash for CallTree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for entry in self {
            entry.depth().hash(state);
            entry.frame().hash(state);
            entry.args().hash(state);
            entry.children().len().hash(state);
        }
    }
}

/// Scope token returned by [`CallTree::step_in`]
///
/// Dropping it steps out of the call exactly once, including on early
/// returns and while unwinding. It cannot be cloned or released by hand.
#[must_use = "dropping the guard immediately steps back out of the call"]
#[derive(Debug)]
pub struct StepGuard<'a> {
    tree: &'a mut CallTree,
}

impl Deref for StepGuard<'_> {
    type Target = CallTree;

    fn deref(&self) -> &CallTree {
        self.tree
    }
}

impl DerefMut for StepGuard<'_> {
    fn deref_mut(&mut self) -> &mut CallTree {
        self.tree
    }
}

impl Drop for StepGuard<'_> {
    fn drop(&mut self) {
        self.tree.step_out();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn site(name: &str, params: &[&str]) -> CallSite {
        CallSite::new("A", name, params.iter().copied())
    }

    fn hash_of(tree: &CallTree) -> u64 {
        let mut hasher = DefaultHasher::new();
        tree.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_new_tree_is_root_only() {
        let tree = CallTree::new();
        assert_eq!(tree.node_count(), 1);
        assert!(tree.root().is_root());
        assert!(tree.root().frame().is_entry_point());
        assert!(tree.is_balanced());
    }

    #[test]
    fn test_step_in_moves_cursor_and_guard_restores_it() {
        let mut tree = CallTree::new();
        {
            let guard = tree.step_in(site("f", &["int"]), [3]);
            assert_eq!(guard.current().depth(), 1);
            assert_eq!(guard.current().args(), ["3".to_string()]);
            assert!(!guard.is_balanced());
        }
        assert!(tree.is_balanced());
        assert_eq!(tree.root().children().len(), 1);
    }

    #[test]
    fn test_guard_released_on_early_return() {
        fn traced(tree: &mut CallTree, fail: bool) -> Result<(), String> {
            let mut guard = tree.step_in(site("f", &["bool"]), [fail]);
            if fail {
                return Err("boom".to_string());
            }
            let _inner = guard.step_in(site("g", &[]), Vec::<String>::new());
            Ok(())
        }

        let mut tree = CallTree::new();
        assert!(traced(&mut tree, true).is_err());
        assert!(traced(&mut tree, false).is_ok());
        assert!(tree.is_balanced());
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.max_depth(), 2);
    }

    #[test]
    fn test_guard_released_while_unwinding() {
        let mut tree = CallTree::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut outer = tree.step_in(site("f", &[]), Vec::<String>::new());
            let _inner = outer.step_in(site("g", &[]), Vec::<String>::new());
            panic!("traced code failed");
        }));
        assert!(result.is_err());
        assert!(tree.is_balanced());
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_arity_mismatch_recorded_as_unresolved() {
        let mut tree = CallTree::new();
        drop(tree.step_in(site("f", &["int"]), Vec::<String>::new()));
        let entry = tree.children_of(EntryId::ROOT).next().unwrap();
        assert_eq!(entry.frame(), &Frame::Unresolved);
        assert!(tree.is_balanced());
    }

    #[test]
    fn test_unprintable_site_recorded_as_unresolved() {
        let mut tree = CallTree::new();
        drop(tree.step_in(site("f", &["HashMap<K, V>"]), ["{}"]));
        let entry = tree.children_of(EntryId::ROOT).next().unwrap();
        assert_eq!(entry.frame(), &Frame::Unresolved);
        assert_eq!(entry.args(), ["{}".to_string()]);
    }

    #[test]
    fn test_scoped_closure() {
        let mut tree = CallTree::new();
        let depth = tree.scoped(site("f", &[]), Vec::<String>::new(), |t| {
            t.scoped(site("g", &[]), Vec::<String>::new(), |t| t.current().depth())
        });
        assert_eq!(depth, 2);
        assert!(tree.is_balanced());
    }

    #[test]
    fn test_parent_links() {
        let mut tree = CallTree::new();
        {
            let mut f = tree.step_in(site("f", &[]), Vec::<String>::new());
            let _g = f.step_in(site("g", &[]), Vec::<String>::new());
        }
        for entry in tree.iter().skip(1) {
            let parent = tree.parent_of(entry).unwrap();
            assert_eq!(entry.depth(), parent.depth() + 1);
        }
    }

    #[test]
    fn test_deep_equality_ignores_build_history() {
        // same shape, different cursor histories
        let mut a = CallTree::new();
        {
            let mut f = a.step_in(site("f", &[]), Vec::<String>::new());
            drop(f.step_in(site("g", &[]), Vec::<String>::new()));
        }
        let mut b = CallTree::new();
        b.scoped(site("f", &[]), Vec::<String>::new(), |t| {
            t.scoped(site("g", &[]), Vec::<String>::new(), |_| ());
        });

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_deep_inequality() {
        let mut a = CallTree::new();
        drop(a.step_in(site("f", &["int"]), [1]));
        let mut b = CallTree::new();
        drop(b.step_in(site("f", &["int"]), [2]));
        let mut c = CallTree::new();
        drop(c.step_in(site("f", &["int"]), [1]));
        drop(c.step_in(site("f", &["int"]), [1]));

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, CallTree::new());
    }

    #[test]
    #[should_panic(expected = "step out imbalance")]
    fn test_step_out_at_root_is_fatal() {
        let mut tree = CallTree::new();
        tree.step_out();
    }
}
