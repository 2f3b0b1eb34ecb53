//! BibTeX parsing, formatting and record conversion
//!
//! This crate is the interchange boundary of the folio suite. It is split in
//! two layers:
//! - a nom-based tokenizer (`parser`) that turns BibTeX text into raw
//!   [`BibtexEntry`] values, recovering per entry instead of failing the file;
//! - a semantic codec (`codec`) that maps raw entries to and from the
//!   [`folio_domain::Production`] record shape, applying the per-type field
//!   tables on export.

pub mod codec;
pub mod entry;
pub mod formatter;
pub mod parser;

pub use codec::{decode, encode, encode_all, entry_to_production, production_to_entry, DecodeResult};
pub use entry::{BibtexEntry, BibtexField};
pub use formatter::{format_entries, format_entry};
pub use parser::{parse, ParseIssue, ParseResult};
