//! Domain types for the folio publication manager
//!
//! This crate provides the canonical data model for bibliographic records:
//! - Production: one bibliographic entry with typed metadata fields
//! - EntryType: the BibTeX-style category that determines the exported field set
//! - SerialNumber: an ISBN/ISSN/DOI identifier attached to a record
//! - Validation: field-level completeness checks surfaced during import

pub mod entry_type;
pub mod production;
pub mod validation;

pub use entry_type::{EntryType, ALL_ENTRY_TYPES};
pub use production::{Production, SerialKind, SerialNumber};
pub use validation::{is_valid, validate_production, ValidationIssue, ValidationSeverity};
