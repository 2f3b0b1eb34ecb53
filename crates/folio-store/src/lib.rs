//! Hierarchical publication store
//!
//! Keeps a named folder tree and a flat record table mutually consistent
//! under create/rename/delete/duplicate/move operations, and moves whole
//! batches of records across the BibTeX boundary. The store is synchronous
//! and exclusively owned; rendering, prompting and file I/O belong to the
//! caller.

pub mod document;
pub mod error;
pub mod import;
pub mod path;
pub mod store;
pub mod tree;

pub use document::Document;
pub use error::StoreError;
pub use import::ImportReport;
pub use path::TreePath;
pub use store::{PublicationStore, RecordRow};
pub use tree::{Folder, Node};
