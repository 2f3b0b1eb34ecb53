//! Error types for the publication store

use thiserror::Error;

/// All recoverable failures of store operations.
///
/// Any operation that returns an error has left the tree and the record
/// table untouched; nothing here is fatal to the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A sibling with this name already exists at that level.
    #[error("name already exists at this level: {0}")]
    NameCollision(String),

    /// A record with this ID already exists somewhere in the tree.
    #[error("record ID already exists: {0}")]
    IdCollision(String),

    /// The operation was called with an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A path or record ID did not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// A move would target a leaf, the source itself, or a descendant of
    /// the source.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// A loaded document violates a structural invariant.
    #[error("malformed document: {0}")]
    MalformedDocument(String),
}
