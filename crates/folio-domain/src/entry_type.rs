//! BibTeX entry types and their field tables

use lazy_static::lazy_static;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// The BibTeX-style category of a record.
///
/// The entry type determines which fields are emitted on export and which
/// field carries the publisher-like name (journal, school, institution, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryType {
    Article,
    Book,
    InBook,
    InCollection,
    InProceedings,
    Manual,
    MastersThesis,
    PhdThesis,
    TechReport,
    Unpublished,
    Misc,
}

/// All entry types, in canonical-name order.
pub const ALL_ENTRY_TYPES: [EntryType; 11] = [
    EntryType::Article,
    EntryType::Book,
    EntryType::InBook,
    EntryType::InCollection,
    EntryType::InProceedings,
    EntryType::Manual,
    EntryType::MastersThesis,
    EntryType::Misc,
    EntryType::PhdThesis,
    EntryType::TechReport,
    EntryType::Unpublished,
];

impl EntryType {
    /// Parse an entry type from a string (case-insensitive).
    ///
    /// Unknown types fall back to `Misc`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "inbook" => Self::InBook,
            "incollection" => Self::InCollection,
            "inproceedings" | "conference" => Self::InProceedings,
            "manual" => Self::Manual,
            "mastersthesis" => Self::MastersThesis,
            "phdthesis" => Self::PhdThesis,
            "techreport" => Self::TechReport,
            "unpublished" => Self::Unpublished,
            _ => Self::Misc,
        }
    }

    /// Convert entry type to canonical string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::InBook => "inbook",
            Self::InCollection => "incollection",
            Self::InProceedings => "inproceedings",
            Self::Manual => "manual",
            Self::MastersThesis => "mastersthesis",
            Self::PhdThesis => "phdthesis",
            Self::TechReport => "techreport",
            Self::Unpublished => "unpublished",
            Self::Misc => "misc",
        }
    }

    /// The BibTeX field that carries the publisher-like name for this type,
    /// if it has one.
    pub fn publicator_field(&self) -> Option<&'static str> {
        match self {
            Self::Article => Some("journal"),
            Self::PhdThesis | Self::MastersThesis => Some("school"),
            Self::InProceedings => Some("booktitle"),
            Self::TechReport => Some("institution"),
            Self::Book => Some("publisher"),
            Self::Manual => Some("organization"),
            _ => None,
        }
    }

    /// Fields this type emits on export.
    pub fn allowed_fields(&self) -> &'static [&'static str] {
        ALLOWED_FIELDS[self]
    }

    /// Whether `field` (lower-case) is emitted for this type.
    pub fn allows_field(&self, field: &str) -> bool {
        self.allowed_fields().contains(&field)
    }
}

lazy_static! {
    /// The historical BibTeX field set per entry type.
    static ref ALLOWED_FIELDS: HashMap<EntryType, &'static [&'static str]> = {
        let mut m: HashMap<EntryType, &'static [&'static str]> = HashMap::new();
        m.insert(
            EntryType::Article,
            &["author", "title", "journal", "year", "volume", "number",
              "pages", "month", "note", "issn", "doi", "url"][..],
        );
        m.insert(
            EntryType::Book,
            &["author", "editor", "title", "publisher", "year", "volume",
              "series", "edition", "month", "note", "isbn", "url"][..],
        );
        m.insert(
            EntryType::InBook,
            &["author", "editor", "title", "chapter", "pages", "publisher",
              "year", "volume", "series", "type", "address", "edition",
              "month", "note", "isbn"][..],
        );
        m.insert(
            EntryType::InCollection,
            &["author", "title", "booktitle", "publisher", "year", "editor",
              "pages", "organization", "series", "address", "edition",
              "month", "note", "isbn"][..],
        );
        m.insert(
            EntryType::InProceedings,
            &["author", "title", "booktitle", "year", "editor", "pages",
              "organization", "publisher", "address", "month", "note",
              "url"][..],
        );
        m.insert(
            EntryType::Manual,
            &["title", "author", "organization", "address", "edition",
              "year", "month", "note", "url"][..],
        );
        m.insert(
            EntryType::MastersThesis,
            &["author", "title", "school", "year", "type", "address",
              "month", "note", "url"][..],
        );
        m.insert(
            EntryType::PhdThesis,
            &["author", "title", "school", "year", "type", "address",
              "month", "note", "url"][..],
        );
        m.insert(
            EntryType::TechReport,
            &["author", "title", "institution", "year", "type", "number",
              "address", "month", "note", "url"][..],
        );
        m.insert(
            EntryType::Unpublished,
            &["author", "title", "note", "year", "month", "url"][..],
        );
        m.insert(
            EntryType::Misc,
            &["author", "title", "howpublished", "month", "year", "note",
              "url"][..],
        );
        m
    };
}

impl Default for EntryType {
    fn default() -> Self {
        Self::Misc
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EntryType::from_str(&s))
    }
}
