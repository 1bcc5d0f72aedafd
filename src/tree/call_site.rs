//! Call-site identifiers and the frame recorded on each tree entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Names a traced call independent of any particular invocation:
/// owner type, method name and ordered parameter types.
///
/// Immutable once built. Equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSite {
    owner_type: String,
    method_name: String,
    param_types: Vec<String>,
}

impl CallSite {
    /// Create a call site from its three parts
    ///
    /// **Public** - constructor
    ///
    /// Any names are accepted, but only sites whose names are plain (see
    /// [`CallSite::is_printable`]) survive the text format. A parameter type
    /// such as `HashMap<K, V>` must be spelled without spaces to be traced.
    pub fn new<O, M, I, P>(owner_type: O, method_name: M, param_types: I) -> Self
    where
        O: Into<String>,
        M: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            owner_type: owner_type.into(),
            method_name: method_name.into(),
            param_types: param_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn owner_type(&self) -> &str {
        &self.owner_type
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn param_types(&self) -> &[String] {
        &self.param_types
    }

    pub fn arity(&self) -> usize {
        self.param_types.len()
    }

    /// True when the text format can carry this site unchanged
    ///
    /// Owner, method and parameter types must be non-empty and free of
    /// whitespace and parentheses. The method may not contain `.` and the
    /// owner may not start with `-`.
    pub fn is_printable(&self) -> bool {
        is_plain_name(&self.owner_type)
            && !self.owner_type.starts_with('-')
            && is_plain_name(&self.method_name)
            && !self.method_name.contains('.')
            && self.param_types.iter().all(|p| is_plain_name(p))
    }
}

/// A name that can stand between the separators of a text line
pub(crate) fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(|c: char| c.is_whitespace() || c == '(' || c == ')')
}

/// `owner.method(type, type)` - the signature without arguments
impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({})",
            self.owner_type,
            self.method_name,
            self.param_types.join(", ")
        )
    }
}

/// What an entry knows about the call it records
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frame {
    /// The synthetic root of a tree
    EntryPoint,

    /// A call whose site was identified
    Call(CallSite),

    /// A call whose site could not be identified; kept so the tree stays balanced
    Unresolved,
}

impl Frame {
    pub fn call_site(&self) -> Option<&CallSite> {
        match self {
            Frame::Call(site) => Some(site),
            _ => None,
        }
    }

    pub fn is_entry_point(&self) -> bool {
        matches!(self, Frame::EntryPoint)
    }
}

impl From<CallSite> for Frame {
    fn from(site: CallSite) -> Self {
        Frame::Call(site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = CallSite::new("A", "f", ["int"]);
        let b = CallSite::new("A".to_string(), "f".to_string(), vec!["int".to_string()]);
        assert_eq!(a, b);
        assert_ne!(a, CallSite::new("A", "f", ["long"]));
        assert_ne!(a, CallSite::new("B", "f", ["int"]));
        assert_ne!(a, CallSite::new("A", "g", ["int"]));
    }

    #[test]
    fn test_display_signature() {
        let site = CallSite::new("pkg.Owner", "run", ["int", "java.lang.String"]);
        assert_eq!(site.to_string(), "pkg.Owner.run(int, java.lang.String)");
        assert_eq!(site.arity(), 2);
    }

    #[test]
    fn test_printable_names() {
        assert!(CallSite::new("calltree::Demo", "run", ["Vec<String>"]).is_printable());
        assert!(CallSite::new("A", "f", Vec::<String>::new()).is_printable());
        assert!(!CallSite::new("A", "f", ["HashMap<K, V>"]).is_printable());
        assert!(!CallSite::new("A", "f", ["(int"]).is_printable());
        assert!(!CallSite::new("A", "a.b", ["int"]).is_printable());
        assert!(!CallSite::new("-A", "f", ["int"]).is_printable());
        assert!(!CallSite::new("", "f", ["int"]).is_printable());
    }

    #[test]
    fn test_frame_accessors() {
        let site = CallSite::new("A", "f", Vec::<String>::new());
        assert_eq!(Frame::from(site.clone()).call_site(), Some(&site));
        assert!(Frame::EntryPoint.is_entry_point());
        assert!(Frame::Unresolved.call_site().is_none());
    }
}
