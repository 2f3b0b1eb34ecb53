//! Persisted document model
//!
//! The document is a single JSON object with two top-level keys:
//! `structure` (the folder tree, folders as nested objects, leaf markers as
//! `null`) and `productions` (record table keyed by ID). Reading and writing
//! the file itself is the caller's job; the store only converts to and from
//! this shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use folio_domain::Production;

use crate::error::StoreError;
use crate::store::PublicationStore;
use crate::tree::Folder;

/// The persisted document shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub structure: Folder,
    pub productions: BTreeMap<String, Production>,
}

impl Document {
    /// Parse a document from JSON text.
    ///
    /// Structural violations (a non-object `structure`, a leaf where a
    /// folder belongs) are reported as [`StoreError::MalformedDocument`].
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        serde_json::from_str(text).map_err(|e| StoreError::MalformedDocument(e.to_string()))
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::MalformedDocument(e.to_string()))
    }

    /// Serialize to pretty-printed JSON, the on-disk format.
    pub fn to_json_pretty(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::MalformedDocument(e.to_string()))
    }
}

impl PublicationStore {
    /// Replace the store contents with a loaded document.
    ///
    /// Documents edited by other means may carry leaf markers without a
    /// record, so the dangling markers are garbage-collected on the way in.
    pub fn load(&mut self, document: Document) -> usize {
        *self = PublicationStore::from_parts(document.structure, document.productions);
        self.garbage_collect()
    }

    /// Snapshot the store as a document.
    pub fn to_document(&self) -> Document {
        let (structure, productions) = self.parts();
        Document {
            structure,
            productions,
        }
    }
}
