//! The hierarchical publication store
//!
//! Owns the folder tree and the flat record table and keeps them mutually
//! consistent. Every operation validates fully before touching either
//! structure, so a returned error always leaves the store exactly as it was.
//! The store holds no selection state; operations return the new path or id
//! so the caller can remap its own selection.

use std::collections::BTreeMap;

use folio_domain::Production;

use crate::error::StoreError;
use crate::path::TreePath;
use crate::tree::{Folder, Node};

/// One row of the flat record listing for a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: String,
    pub title: String,
    pub parent_path: TreePath,
}

impl RecordRow {
    /// Case-insensitive substring match over title and id.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.id.to_lowercase().contains(&query)
    }
}

/// In-memory store of the folder tree and the record table.
///
/// Single-threaded and synchronous; exclusively owned by its caller. Record
/// IDs form one flat, case-sensitive namespace across the whole tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublicationStore {
    root: Folder,
    records: BTreeMap<String, Production>,
}

impl PublicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(root: Folder, records: BTreeMap<String, Production>) -> Self {
        Self { root, records }
    }

    pub(crate) fn parts(&self) -> (Folder, BTreeMap<String, Production>) {
        (self.root.clone(), self.records.clone())
    }

    /// Drop the whole structure and record table.
    pub fn clear(&mut self) {
        self.root = Folder::new();
        self.records.clear();
    }

    /// The root folder, for read-only traversal by a renderer.
    pub fn root(&self) -> &Folder {
        &self.root
    }

    /// The record table, keyed by ID.
    pub fn records(&self) -> &BTreeMap<String, Production> {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&Production> {
        self.records.get(id)
    }

    pub fn record_mut(&mut self, id: &str) -> Option<&mut Production> {
        self.records.get_mut(id)
    }

    /// Resolve a non-root path to its node.
    ///
    /// The root folder itself has no containing node; address it through
    /// [`PublicationStore::root`] or with the empty path in folder-taking
    /// operations.
    pub fn resolve_path(&self, path: &TreePath) -> Result<&Node, StoreError> {
        if path.is_root() {
            return Err(StoreError::InvalidArgument(
                "the root is not addressable as a node".to_string(),
            ));
        }
        self.root
            .resolve(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    /// Resolve a path that must end at a folder; the empty path is the root.
    fn folder_at(&self, path: &TreePath) -> Result<&Folder, StoreError> {
        self.root
            .resolve_folder(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn folder_at_mut(&mut self, path: &TreePath) -> Result<&mut Folder, StoreError> {
        self.root
            .resolve_folder_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    /// Create an empty folder under `parent`. Returns the new folder's path.
    pub fn create_folder(
        &mut self,
        parent: &TreePath,
        name: &str,
    ) -> Result<TreePath, StoreError> {
        require_name(name)?;
        let folder = self.folder_at_mut(parent)?;
        if folder.contains(name) {
            return Err(StoreError::NameCollision(name.to_string()));
        }
        folder.insert(name, Node::Folder(Folder::new()));
        tracing::debug!(path = %parent.child(name), "created folder");
        Ok(parent.child(name))
    }

    /// Rename the folder at `path`, preserving its subtree. Returns the new
    /// path so the caller can remap any selection it holds.
    pub fn rename_folder(
        &mut self,
        path: &TreePath,
        new_name: &str,
    ) -> Result<TreePath, StoreError> {
        require_name(new_name)?;
        let (parent_path, old_name) = path.split_last().ok_or_else(|| {
            StoreError::InvalidArgument("the root folder cannot be renamed".to_string())
        })?;
        let old_name = old_name.to_string();

        let parent = self.folder_at_mut(&parent_path)?;
        match parent.get(&old_name) {
            Some(Node::Folder(_)) => {}
            Some(Node::Leaf) => {
                return Err(StoreError::InvalidArgument(format!(
                    "{path} is a record, not a folder"
                )))
            }
            None => return Err(StoreError::NotFound(path.to_string())),
        }
        if new_name == old_name {
            return Ok(path.clone());
        }
        if parent.contains(new_name) {
            return Err(StoreError::NameCollision(new_name.to_string()));
        }

        if let Some(subtree) = parent.remove(&old_name) {
            parent.insert(new_name, subtree);
        }
        tracing::debug!(from = %path, to = %parent_path.child(new_name), "renamed folder");
        Ok(parent_path.child(new_name))
    }

    /// Insert `template` under `parent` as a new record with the given id.
    pub fn create_record(
        &mut self,
        parent: &TreePath,
        id: &str,
        template: Production,
    ) -> Result<(), StoreError> {
        require_name(id)?;
        if self.records.contains_key(id) {
            return Err(StoreError::IdCollision(id.to_string()));
        }
        let folder = self.folder_at_mut(parent)?;
        if folder.contains(id) {
            // A folder with this name occupies the sibling namespace.
            return Err(StoreError::NameCollision(id.to_string()));
        }
        folder.insert(id, Node::Leaf);
        self.records.insert(id.to_string(), template);
        tracing::debug!(id, parent = %parent, "created record");
        Ok(())
    }

    /// Deep-copy the record `id` under `new_id`, in the same parent folder.
    pub fn duplicate_record(&mut self, id: &str, new_id: &str) -> Result<(), StoreError> {
        require_name(new_id)?;
        if new_id == id {
            return Err(StoreError::InvalidArgument(
                "the new ID must differ from the original".to_string(),
            ));
        }
        if self.records.contains_key(new_id) {
            return Err(StoreError::IdCollision(new_id.to_string()));
        }
        let parent_path = self
            .find_record(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if self.folder_at(&parent_path)?.contains(new_id) {
            return Err(StoreError::NameCollision(new_id.to_string()));
        }

        let copy = match self.records.get(id) {
            Some(record) => record.clone(),
            None => return Err(StoreError::NotFound(id.to_string())),
        };
        self.folder_at_mut(&parent_path)?.insert(new_id, Node::Leaf);
        self.records.insert(new_id.to_string(), copy);
        tracing::debug!(id, new_id, "duplicated record");
        Ok(())
    }

    /// Re-key a record: both the leaf marker and the table entry move to
    /// `new_id`, or neither does.
    pub fn rename_record_id(&mut self, old_id: &str, new_id: &str) -> Result<(), StoreError> {
        require_name(new_id)?;
        if new_id == old_id {
            return Err(StoreError::InvalidArgument(
                "the new ID must differ from the original".to_string(),
            ));
        }
        if self.records.contains_key(new_id) {
            return Err(StoreError::IdCollision(new_id.to_string()));
        }
        let parent_path = self
            .find_record(old_id)
            .ok_or_else(|| StoreError::NotFound(old_id.to_string()))?;
        if self.folder_at(&parent_path)?.contains(new_id) {
            return Err(StoreError::NameCollision(new_id.to_string()));
        }

        let record = match self.records.remove(old_id) {
            Some(record) => record,
            None => return Err(StoreError::NotFound(old_id.to_string())),
        };
        let parent = match self.folder_at_mut(&parent_path) {
            Ok(parent) => parent,
            Err(err) => {
                // Put the record back before reporting; the table and the
                // tree re-key together or not at all.
                self.records.insert(old_id.to_string(), record);
                return Err(err);
            }
        };
        parent.remove(old_id);
        parent.insert(new_id, Node::Leaf);
        self.records.insert(new_id.to_string(), record);
        tracing::debug!(old_id, new_id, "renamed record id");
        Ok(())
    }

    /// Remove the record and its leaf marker. A no-op when `id` is absent.
    pub fn delete_record(&mut self, id: &str) {
        if let Some(parent_path) = self.find_record(id) {
            if let Ok(parent) = self.folder_at_mut(&parent_path) {
                parent.remove(id);
            }
        }
        self.records.remove(id);
        self.garbage_collect();
    }

    /// Remove the folder at `path` with every record under it. Returns the
    /// number of records removed.
    pub fn delete_folder(&mut self, path: &TreePath) -> Result<usize, StoreError> {
        let (parent_path, name) = path.split_last().ok_or_else(|| {
            StoreError::InvalidArgument("the root folder cannot be deleted".to_string())
        })?;
        let name = name.to_string();

        let folder = match self.folder_at(&parent_path)?.get(&name) {
            Some(Node::Folder(folder)) => folder,
            Some(Node::Leaf) => {
                return Err(StoreError::InvalidArgument(format!(
                    "{path} is a record, not a folder"
                )))
            }
            None => return Err(StoreError::NotFound(path.to_string())),
        };

        // Dangling stubs under the subtree are ignored; they only ever
        // shadow records that no longer exist.
        let doomed: Vec<String> = folder
            .leaves(path)
            .into_iter()
            .map(|(id, _)| id)
            .filter(|id| self.records.contains_key(id))
            .collect();

        self.folder_at_mut(&parent_path)?.remove(&name);
        for id in &doomed {
            self.records.remove(id);
        }
        self.garbage_collect();
        tracing::debug!(path = %path, records = doomed.len(), "deleted folder");
        Ok(doomed.len())
    }

    /// Re-parent the folder or record at `source` into `target_folder`.
    ///
    /// Validates, in order: the target resolves to a folder (never a leaf);
    /// the move would not place the source inside itself; the source's name
    /// is free in the target. The subtree is copied into the target and then
    /// removed from the source as one logical transaction. Returns the new
    /// path of the moved node.
    pub fn move_node(
        &mut self,
        source: &TreePath,
        target_folder: &TreePath,
    ) -> Result<TreePath, StoreError> {
        let (source_parent, name) = source.split_last().ok_or_else(|| {
            StoreError::InvalidArgument("the root folder cannot be moved".to_string())
        })?;
        let name = name.to_string();

        // (1) Target must be an existing folder. The root always is one.
        if !target_folder.is_root() {
            match self.root.resolve(target_folder) {
                Some(Node::Folder(_)) => {}
                Some(Node::Leaf) => {
                    return Err(StoreError::InvalidMove(format!(
                        "target {target_folder} is a record, not a folder"
                    )))
                }
                None => return Err(StoreError::NotFound(target_folder.to_string())),
            }
        }

        // (2) No move of a node into itself or its own subtree.
        if source.is_ancestor_or_self_of(target_folder) {
            return Err(StoreError::InvalidMove(format!(
                "target {target_folder} is inside the source {source}"
            )));
        }

        let source_node = self
            .root
            .resolve(source)
            .ok_or_else(|| StoreError::NotFound(source.to_string()))?;

        // (3) The terminal name must be free in the target.
        if self.folder_at(target_folder)?.contains(&name) {
            return Err(StoreError::NameCollision(name.clone()));
        }

        // Copy into the target, then delete the original: the tree has no
        // back-references, so value copies cannot alias.
        let copied = source_node.clone();
        self.folder_at_mut(target_folder)?.insert(name.clone(), copied);
        self.folder_at_mut(&source_parent)?.remove(&name);
        tracing::debug!(from = %source, to = %target_folder, "moved node");
        Ok(target_folder.child(name))
    }

    /// `(id, parent_path)` pairs for every record reachable under `path`,
    /// depth-first in name order. A leaf path yields just that record.
    /// Dangling markers without a table entry are skipped.
    pub fn list_records_under(
        &self,
        path: &TreePath,
    ) -> Result<Vec<(String, TreePath)>, StoreError> {
        if let Some((parent, id)) = path.split_last() {
            if let Some(Node::Leaf) = self.root.resolve(path) {
                if self.records.contains_key(id) {
                    return Ok(vec![(id.to_string(), parent)]);
                }
                return Ok(Vec::new());
            }
        }
        let folder = self.folder_at(path)?;
        Ok(folder
            .leaves(path)
            .into_iter()
            .filter(|(id, _)| self.records.contains_key(id))
            .collect())
    }

    /// Parent path of the leaf marker for `id`, if the record is in the tree.
    pub fn find_record(&self, id: &str) -> Option<TreePath> {
        fn search(folder: &Folder, at: &TreePath, id: &str) -> Option<TreePath> {
            for (name, node) in folder.children() {
                match node {
                    Node::Leaf if name == id => return Some(at.clone()),
                    Node::Folder(child) => {
                        if let Some(found) = search(child, &at.child(name), id) {
                            return Some(found);
                        }
                    }
                    Node::Leaf => {}
                }
            }
            None
        }
        search(&self.root, &TreePath::root(), id)
    }

    /// Flat table rows for the records under `path`.
    pub fn record_rows(&self, path: &TreePath) -> Result<Vec<RecordRow>, StoreError> {
        Ok(self
            .list_records_under(path)?
            .into_iter()
            .map(|(id, parent_path)| RecordRow {
                title: self.records[&id].title.clone(),
                id,
                parent_path,
            })
            .collect())
    }

    /// Table rows under `path`, filtered by a case-insensitive substring
    /// match over title and id.
    pub fn filter_rows(&self, path: &TreePath, query: &str) -> Result<Vec<RecordRow>, StoreError> {
        let mut rows = self.record_rows(path)?;
        if !query.trim().is_empty() {
            rows.retain(|row| row.matches(query.trim()));
        }
        Ok(rows)
    }

    /// Remove every leaf marker without a matching record. Returns the
    /// number of markers removed.
    ///
    /// This is the self-healing pass for the one invariant the store
    /// tolerates being transiently broken; it runs after structural
    /// mutations and after loading externally edited documents.
    pub fn garbage_collect(&mut self) -> usize {
        let records = std::mem::take(&mut self.records);
        let removed = self.root.prune_leaves(&|id| records.contains_key(id));
        self.records = records;
        if removed > 0 {
            tracing::debug!(removed, "garbage-collected dangling leaf markers");
        }
        removed
    }
}

fn require_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidArgument(
            "names must not be empty".to_string(),
        ));
    }
    Ok(())
}
