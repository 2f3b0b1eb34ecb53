//! Structure tree
//!
//! The tree is a tagged variant: a node is either a folder owning its
//! children by value, or a leaf marker whose key in the parent folder is a
//! record ID. Leaves structurally cannot have children, and sibling names
//! (folders and leaf keys share one namespace) are unique by construction.
//!
//! The serialized shape stays compatible with documents written by earlier
//! versions: folders are JSON objects, leaf markers are `null` values.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::path::TreePath;

/// One node of the structure tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Folder(Folder),
    Leaf,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf)
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::Leaf => None,
        }
    }
}

/// A folder: named children, kept sorted for deterministic listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Folder {
    children: BTreeMap<String, Node>,
}

impl Folder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Children in name order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Insert a child, replacing any existing one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) -> Option<Node> {
        self.children.insert(name.into(), node)
    }

    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.children.remove(name)
    }

    /// Walk folder names from this node; `None` if any segment is missing.
    pub fn resolve(&self, path: &TreePath) -> Option<&Node> {
        let mut current = self;
        let mut segments = path.segments().iter().peekable();
        while let Some(segment) = segments.next() {
            let node = current.children.get(segment)?;
            if segments.peek().is_none() {
                return Some(node);
            }
            current = node.as_folder()?;
        }
        // Empty path: the root folder itself has no containing Node, so the
        // caller handles it; reaching here means path was non-empty.
        None
    }

    /// Resolve a path that must end at a folder (the root for an empty path).
    pub fn resolve_folder(&self, path: &TreePath) -> Option<&Folder> {
        let mut current = self;
        for segment in path.segments() {
            current = current.children.get(segment)?.as_folder()?;
        }
        Some(current)
    }

    pub fn resolve_folder_mut(&mut self, path: &TreePath) -> Option<&mut Folder> {
        let mut current = self;
        for segment in path.segments() {
            current = match current.children.get_mut(segment)? {
                Node::Folder(folder) => folder,
                Node::Leaf => return None,
            };
        }
        Some(current)
    }

    /// Every leaf key in this subtree, with its parent path, depth-first in
    /// name order.
    pub fn leaves(&self, at: &TreePath) -> Vec<(String, TreePath)> {
        let mut out = Vec::new();
        self.collect_leaves(at, &mut out);
        out
    }

    fn collect_leaves(&self, at: &TreePath, out: &mut Vec<(String, TreePath)>) {
        for (name, node) in &self.children {
            match node {
                Node::Leaf => out.push((name.clone(), at.clone())),
                Node::Folder(folder) => folder.collect_leaves(&at.child(name.clone()), out),
            }
        }
    }

    /// Recursively drop leaf keys rejected by `keep`. Folders always stay;
    /// empty folders are intentional structure. Returns the number removed.
    pub fn prune_leaves<F: Fn(&str) -> bool>(&mut self, keep: &F) -> usize {
        let mut removed = 0;
        let dangling: Vec<String> = self
            .children
            .iter()
            .filter(|(name, node)| node.is_leaf() && !keep(name))
            .map(|(name, _)| name.clone())
            .collect();
        for name in dangling {
            self.children.remove(&name);
            removed += 1;
        }
        for node in self.children.values_mut() {
            if let Node::Folder(folder) = node {
                removed += folder.prune_leaves(keep);
            }
        }
        removed
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf => serializer.serialize_unit(),
            Node::Folder(folder) => folder.serialize(serializer),
        }
    }
}

impl Serialize for Folder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len()))?;
        for (name, node) in &self.children {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a folder object or null leaf marker")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Node, E> {
        Ok(Node::Leaf)
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Node, E> {
        Ok(Node::Leaf)
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Node, A::Error> {
        Ok(Node::Folder(folder_from_map(access)?))
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct FolderVisitor;

impl<'de> Visitor<'de> for FolderVisitor {
    type Value = Folder;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a folder object")
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Folder, A::Error> {
        folder_from_map(access)
    }
}

fn folder_from_map<'de, A: MapAccess<'de>>(mut access: A) -> Result<Folder, A::Error> {
    let mut folder = Folder::new();
    while let Some((name, node)) = access.next_entry::<String, Node>()? {
        folder.insert(name, node);
    }
    Ok(folder)
}

impl<'de> Deserialize<'de> for Folder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FolderVisitor)
    }
}
