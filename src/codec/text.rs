//! Text encoding of call trees.
//!
//! One line per entry in pre-order, then a blank line:
//!
//! ```text
//! entry_point
//! -pkg.A.f(int var0 = 3)
//! --pkg.A.g(java.lang.String var0 = hi)
//!
//! ```

use crate::tree::CallTree;
use std::fmt;
use std::io::{self, Write};

impl fmt::Display for CallTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self {
            writeln!(f, "{}", entry)?;
        }
        writeln!(f)
    }
}

/// Encode a tree to its text form, blank terminator included
///
/// **Public** - pure and order-preserving
pub fn encode(tree: &CallTree) -> String {
    tree.to_string()
}

/// Write one tree to `out`
pub fn write_tree<W: Write + ?Sized>(tree: &CallTree, out: &mut W) -> io::Result<()> {
    write!(out, "{}", tree)
}

/// Write a stream of trees, each terminated by its blank line
///
/// # Returns
/// Number of trees written
pub fn write_trees<'a, W, I>(trees: I, out: &mut W) -> io::Result<usize>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a CallTree>,
{
    let mut count = 0;
    for tree in trees {
        write_tree(tree, out)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::CallSite;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_root_only() {
        assert_eq!(encode(&CallTree::new()), "entry_point\n\n");
    }

    #[test]
    fn test_encode_nested_calls() {
        let mut tree = CallTree::new();
        {
            let mut f = tree.step_in(CallSite::new("A", "f", ["int"]), [3]);
            drop(f.step_in(CallSite::new("A", "g", ["java.lang.String"]), ["hi"]));
        }
        drop(tree.step_in(CallSite::new("A", "h", ["int", "int"]), [1, 2]));

        assert_eq!(
            encode(&tree),
            "entry_point\n\
             -A.f(int var0 = 3)\n\
             --A.g(java.lang.String var0 = hi)\n\
             -A.h(int var0 = 1, int var1 = 2)\n\
             \n"
        );
    }

    #[test]
    fn test_encode_unresolved_entry() {
        let mut tree = CallTree::new();
        drop(tree.step_in(CallSite::new("A", "f", Vec::<String>::new()), ["x"]));
        assert_eq!(encode(&tree), "entry_point\n-?.?(? var0 = x)\n\n");
    }

    #[test]
    fn test_write_trees_separates_with_blank_lines() {
        let a = CallTree::new();
        let mut b = CallTree::new();
        drop(b.step_in(CallSite::new("B", "run", Vec::<String>::new()), Vec::<String>::new()));

        let mut out = Vec::new();
        let written = write_trees([&a, &b], &mut out).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "entry_point\n\nentry_point\n-B.run()\n\n"
        );
    }
}
