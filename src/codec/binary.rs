//! Structural (binary) serialization of call trees.
//!
//! Each tree is one bincode record holding the whole arena: every node's
//! depth, frame, arguments and child indices. Call sites are stored as their
//! explicit owner/method/parameter names. Records are simply concatenated;
//! the stream ends at EOF.
//!
//! Loading validates the arena and rebuilds parent links, so a record can
//! never produce a tree that breaks the depth or single-parent invariants.

use crate::tree::{CallTree, EntryId, Frame};
use crate::utils::config::{BINARY_FORMAT_VERSION, MAX_RECORD_BYTES};
use crate::utils::error::BinaryError;
use bincode::Options;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

/// On-disk form of one tree
#[derive(Debug, Serialize, Deserialize)]
struct TreeRecord {
    version: u16,
    nodes: Vec<NodeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    depth: usize,
    frame: Frame,
    args: Vec<String>,
    children: Vec<usize>,
}

impl From<&CallTree> for TreeRecord {
    fn from(tree: &CallTree) -> Self {
        let nodes = (0..tree.node_count())
            .map(|index| {
                let entry = &tree[EntryId::new(index)];
                NodeRecord {
                    depth: entry.depth(),
                    frame: entry.frame().clone(),
                    args: entry.args().to_vec(),
                    children: entry.children().iter().map(|c| c.index()).collect(),
                }
            })
            .collect();

        Self {
            version: BINARY_FORMAT_VERSION,
            nodes,
        }
    }
}

/// Fixed-width integers, as `bincode::serialize` writes them, with a cap on
/// record size so a corrupt length prefix fails instead of allocating
fn record_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(MAX_RECORD_BYTES)
}

/// Validate a record and rebuild the tree it describes
fn rebuild(record: TreeRecord) -> Result<CallTree, BinaryError> {
    if record.version != BINARY_FORMAT_VERSION {
        return Err(BinaryError::UnsupportedVersion(record.version));
    }

    // each slot is taken exactly once; a second take means a second parent
    let mut nodes: Vec<Option<NodeRecord>> = record.nodes.into_iter().map(Some).collect();

    let root = nodes
        .first_mut()
        .and_then(Option::take)
        .ok_or_else(|| BinaryError::Corrupt("record has no nodes".to_string()))?;
    if root.depth != 0 || !root.frame.is_entry_point() || !root.args.is_empty() {
        return Err(BinaryError::Corrupt("first node is not an entry point".to_string()));
    }

    let mut tree = CallTree::new();
    let mut pending = vec![(EntryId::ROOT, root.depth, root.children)];

    while let Some((parent, parent_depth, children)) = pending.pop() {
        let mut attached = Vec::with_capacity(children.len());

        for index in children {
            let node = nodes.get_mut(index).and_then(Option::take).ok_or_else(|| {
                BinaryError::Corrupt(format!("node {} is missing or has more than one parent", index))
            })?;
            validate_node(index, &node, parent_depth)?;

            let id = tree.attach(parent, node.frame, node.args);
            attached.push((id, node.depth, node.children));
        }

        // reversed so siblings are expanded in order
        pending.extend(attached.into_iter().rev());
    }

    if let Some(index) = nodes.iter().position(Option::is_some) {
        return Err(BinaryError::Corrupt(format!("node {} is unreachable from the root", index)));
    }

    Ok(tree)
}

fn validate_node(index: usize, node: &NodeRecord, parent_depth: usize) -> Result<(), BinaryError> {
    if node.depth != parent_depth + 1 {
        return Err(BinaryError::Corrupt(format!(
            "node {} has depth {} under a parent of depth {}",
            index, node.depth, parent_depth
        )));
    }
    match &node.frame {
        Frame::EntryPoint => Err(BinaryError::Corrupt(format!(
            "node {} is a nested entry point",
            index
        ))),
        Frame::Call(site) if site.arity() != node.args.len() => Err(BinaryError::Corrupt(format!(
            "node {} has {} argument(s) for {}",
            index,
            node.args.len(),
            site
        ))),
        _ => Ok(()),
    }
}

/// Serialize one tree
pub fn write_tree_binary<W: Write + ?Sized>(tree: &CallTree, out: &mut W) -> Result<(), BinaryError> {
    record_options().serialize_into(out, &TreeRecord::from(tree))?;
    Ok(())
}

/// Serialize a stream of trees
///
/// # Returns
/// Number of trees written
pub fn write_trees_binary<'a, W, I>(trees: I, out: &mut W) -> Result<usize, BinaryError>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a CallTree>,
{
    let mut count = 0;
    for tree in trees {
        write_tree_binary(tree, out)?;
        count += 1;
    }
    out.flush()?;
    debug!("Serialized {} tree(s)", count);
    Ok(count)
}

/// Iterator over the trees of a binary stream
///
/// **Public** - counterpart of [`write_trees_binary`]
///
/// Stops at a clean EOF between records. Any error ends the stream, since a
/// broken record leaves the reader at an unknown offset.
pub struct BinaryDecoder<R> {
    reader: R,
    finished: bool,
}

impl<R: BufRead> BinaryDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            finished: false,
        }
    }

    fn read_next(&mut self) -> Result<Option<CallTree>, BinaryError> {
        if self.reader.fill_buf()?.is_empty() {
            return Ok(None);
        }
        let record: TreeRecord = record_options()
            .deserialize_from(&mut self.reader)
            .map_err(|e| match *e {
                bincode::ErrorKind::SizeLimit => BinaryError::Corrupt(format!(
                    "record exceeds {} bytes",
                    MAX_RECORD_BYTES
                )),
                other => BinaryError::Encoding(Box::new(other)),
            })?;
        rebuild(record).map(Some)
    }
}

impl<R: BufRead> Iterator for BinaryDecoder<R> {
    type Item = Result<CallTree, BinaryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_next() {
            Ok(Some(tree)) => Some(Ok(tree)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Read every tree of a binary stream, failing on the first bad record
pub fn read_trees_binary<R: BufRead>(reader: R) -> Result<Vec<CallTree>, BinaryError> {
    BinaryDecoder::new(reader).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::CallSite;

    fn sample() -> CallTree {
        let mut tree = CallTree::new();
        {
            let mut f = tree.step_in(CallSite::new("A", "f", ["int"]), [3]);
            drop(f.step_in(CallSite::new("A", "g", ["java.lang.String"]), ["hi"]));
        }
        drop(tree.step_in(CallSite::new("A", "h", Vec::<String>::new()), Vec::<String>::new()));
        tree
    }

    #[test]
    fn test_record_preserves_structure() {
        let tree = sample();
        let rebuilt = rebuild(TreeRecord::from(&tree)).unwrap();
        assert_eq!(rebuilt, tree);
        assert!(rebuilt.is_balanced());
    }

    #[test]
    fn test_empty_stream() {
        let trees = read_trees_binary(&b""[..]).unwrap();
        assert!(trees.is_empty());
    }

    #[test]
    fn test_wrong_version() {
        let mut record = TreeRecord::from(&sample());
        record.version = 99;
        assert!(matches!(rebuild(record), Err(BinaryError::UnsupportedVersion(99))));
    }

    #[test]
    fn test_shared_child_rejected() {
        let mut record = TreeRecord::from(&sample());
        let shared = record.nodes[0].children[0];
        record.nodes[0].children.push(shared);
        assert!(matches!(rebuild(record), Err(BinaryError::Corrupt(_))));
    }

    #[test]
    fn test_depth_mismatch_rejected() {
        let mut record = TreeRecord::from(&sample());
        record.nodes[1].depth = 5;
        assert!(matches!(rebuild(record), Err(BinaryError::Corrupt(_))));
    }

    #[test]
    fn test_orphan_rejected() {
        let mut record = TreeRecord::from(&sample());
        record.nodes[0].children.clear();
        assert!(matches!(rebuild(record), Err(BinaryError::Corrupt(_))));
    }

    #[test]
    fn test_truncated_stream() {
        let mut bytes = Vec::new();
        write_trees_binary([&sample()], &mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        let results: Vec<_> = BinaryDecoder::new(&bytes[..]).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_oversized_length_prefix() {
        // one root node whose single argument claims to be 1 TiB long
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&BINARY_FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&1u64.to_le_bytes()); // nodes
        bytes.extend_from_slice(&0u64.to_le_bytes()); // depth
        bytes.extend_from_slice(&0u32.to_le_bytes()); // Frame::EntryPoint
        bytes.extend_from_slice(&1u64.to_le_bytes()); // args
        bytes.extend_from_slice(&(1u64 << 40).to_le_bytes());
        bytes.extend_from_slice(b"abc");

        let err = read_trees_binary(&bytes[..]).unwrap_err();
        assert!(matches!(err, BinaryError::Corrupt(_)), "{err}");
    }

    #[test]
    fn test_records_match_plain_bincode() {
        let tree = sample();
        let mut bytes = Vec::new();
        write_tree_binary(&tree, &mut bytes).unwrap();
        assert_eq!(bytes, bincode::serialize(&TreeRecord::from(&tree)).unwrap());
    }
}
