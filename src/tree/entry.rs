//! Tree nodes and the arena handles that link them.

use super::call_site::Frame;
use crate::codec::escape::escape_arg;
use crate::utils::config::{ENTRY_POINT_IDENT, UNRESOLVED_MARKER};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of an entry inside its tree's arena
///
/// Handles are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(usize);

impl EntryId {
    /// The root always occupies the first arena slot
    pub const ROOT: EntryId = EntryId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One recorded invocation, or the synthetic root
///
/// Children are owned through the arena; `parent` is a plain back-index.
#[derive(Debug, Clone)]
pub struct CallTreeEntry {
    id: EntryId,
    depth: usize,
    frame: Frame,
    args: Vec<String>,
    children: Vec<EntryId>,
    parent: Option<EntryId>,
}

impl CallTreeEntry {
    pub(crate) fn root() -> Self {
        Self {
            id: EntryId::ROOT,
            depth: 0,
            frame: Frame::EntryPoint,
            args: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub(crate) fn child_of(parent: &CallTreeEntry, id: EntryId, frame: Frame, args: Vec<String>) -> Self {
        Self {
            id,
            depth: parent.depth + 1,
            frame,
            args,
            children: Vec::new(),
            parent: Some(parent.id),
        }
    }

    pub(crate) fn push_child(&mut self, child: EntryId) {
        self.children.push(child);
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Child handles in call order
    pub fn children(&self) -> &[EntryId] {
        &self.children
    }

    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Shallow equality: depth, frame and arguments. Children are not compared.
impl PartialEq for CallTreeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth && self.frame == other.frame && self.args == other.args
    }
}

impl Eq for CallTreeEntry {}

/// One line of the text format, without the trailing newline
///
/// Argument values are escaped so the entry never spans lines.
impl fmt::Display for CallTreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (owner, method, params): (&str, &str, Vec<&str>) = match &self.frame {
            Frame::EntryPoint => return f.write_str(ENTRY_POINT_IDENT),
            Frame::Call(site) => (
                site.owner_type(),
                site.method_name(),
                site.param_types().iter().map(String::as_str).collect(),
            ),
            Frame::Unresolved => (
                UNRESOLVED_MARKER,
                UNRESOLVED_MARKER,
                vec![UNRESOLVED_MARKER; self.args.len()],
            ),
        };

        write!(f, "{}{}.{}(", "-".repeat(self.depth), owner, method)?;
        for (i, (param, arg)) in params.iter().zip(&self.args).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} var{} = {}", param, i, escape_arg(arg))?;
        }
        f.write_str(")")
    }
}
