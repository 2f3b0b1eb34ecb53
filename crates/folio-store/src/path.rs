//! Tree paths
//!
//! A path is the ordered list of names from the (synthetic, unnamed) root
//! down to a node. The empty path addresses the root folder itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A path into the structure tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreePath(Vec<String>);

impl TreePath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The terminal name, if this is not the root.
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// This path extended by one child name.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// Split into parent path and terminal name; `None` for the root.
    pub fn split_last(&self) -> Option<(TreePath, &str)> {
        let (last, parent) = self.0.split_last()?;
        Some((Self(parent.to_vec()), last.as_str()))
    }

    /// Parent path; `None` for the root.
    pub fn parent(&self) -> Option<TreePath> {
        self.split_last().map(|(parent, _)| parent)
    }

    /// Whether `self` is `other` or an ancestor of it.
    pub fn is_ancestor_or_self_of(&self, other: &TreePath) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            for segment in &self.0 {
                write!(f, "/{segment}")?;
            }
            Ok(())
        }
    }
}

impl From<Vec<String>> for TreePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl<const N: usize> From<[&str; N]> for TreePath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl FromIterator<String> for TreePath {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_and_child() {
        let root = TreePath::root();
        assert!(root.is_root());
        assert_eq!(root.to_string(), "/");

        let papers = root.child("Papers");
        assert_eq!(papers.segments(), ["Papers"]);
        assert_eq!(papers.to_string(), "/Papers");
        assert_eq!(papers.name(), Some("Papers"));
    }

    #[test]
    fn test_split_last() {
        let path = TreePath::from(["A", "B", "r1"]);
        let (parent, name) = path.split_last().unwrap();
        assert_eq!(parent, TreePath::from(["A", "B"]));
        assert_eq!(name, "r1");
        assert!(TreePath::root().split_last().is_none());
    }

    #[test]
    fn test_ancestor_prefix() {
        let a = TreePath::from(["A"]);
        let ab = TreePath::from(["A", "B"]);
        let ax = TreePath::from(["AX"]);

        assert!(a.is_ancestor_or_self_of(&a));
        assert!(a.is_ancestor_or_self_of(&ab));
        assert!(!ab.is_ancestor_or_self_of(&a));
        // Prefix comparison is per segment, not per character.
        assert!(!a.is_ancestor_or_self_of(&ax));
        assert!(TreePath::root().is_ancestor_or_self_of(&ab));
    }
}
