//! Production domain model

use crate::entry_type::EntryType;
use chrono::{Datelike, Utc};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of serial number attached to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialKind {
    Isbn,
    Issn,
    Doi,
}

impl SerialKind {
    /// The BibTeX field name carrying this kind of serial number.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Isbn => "isbn",
            Self::Issn => "issn",
            Self::Doi => "doi",
        }
    }

    /// Parse a field name into a serial kind.
    pub fn from_field_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "isbn" => Some(Self::Isbn),
            "issn" => Some(Self::Issn),
            "doi" => Some(Self::Doi),
            _ => None,
        }
    }
}

/// An ISBN/ISSN/DOI identifier attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialNumber {
    #[serde(rename = "type")]
    pub kind: SerialKind,
    pub value: String,
}

impl SerialNumber {
    pub fn new(kind: SerialKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// A bibliographic record (production).
///
/// Every display field is always present (empty string rather than absent) so
/// editors can rely on a stable field set. Fields imported from BibTeX that
/// the store does not interpret are preserved verbatim in `extra` and
/// serialized inline with the known fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Production {
    #[serde(rename = "type", default)]
    pub entry_type: EntryType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "stringy")]
    pub year: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub language: String,
    #[serde(default, deserialize_with = "stringy")]
    pub version: String,
    #[serde(default)]
    pub publicator_name: String,
    #[serde(default)]
    pub serial_numbers: Vec<SerialNumber>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Production {
    /// Create an empty record of the given type.
    pub fn new(entry_type: EntryType) -> Self {
        Self {
            entry_type,
            title: String::new(),
            subtitle: String::new(),
            authors: Vec::new(),
            year: String::new(),
            url: String::new(),
            language: String::new(),
            version: String::new(),
            publicator_name: String::new(),
            serial_numbers: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Create the placeholder record used when a new production of the given
    /// type is added to the tree.
    pub fn template(entry_type: EntryType) -> Self {
        let mut prod = Self::new(entry_type);
        prod.title = "New Publication".to_string();
        prod.authors = vec!["Author Name".to_string()];
        prod.year = Utc::now().year().to_string();
        prod.url = "https://example.com".to_string();
        prod.language = "English".to_string();
        prod.version = "1".to_string();
        prod.publicator_name = match entry_type {
            EntryType::Article => "Sample Journal",
            EntryType::Book => "Sample Publisher",
            EntryType::Manual => "Sample Organization",
            EntryType::InProceedings => "Sample Conference Proceedings",
            EntryType::TechReport => "Sample Institution",
            EntryType::PhdThesis | EntryType::MastersThesis => "Sample University",
            _ => "",
        }
        .to_string();
        prod.serial_numbers = match entry_type {
            EntryType::Book | EntryType::InBook | EntryType::InCollection => {
                vec![SerialNumber::new(SerialKind::Isbn, "978-3-16-148410-0")]
            }
            EntryType::Article => {
                vec![SerialNumber::new(SerialKind::Doi, "10.1000/sample")]
            }
            _ => Vec::new(),
        };
        prod
    }

    /// Title and subtitle rejoined for display and export.
    pub fn full_title(&self) -> String {
        if self.subtitle.trim().is_empty() {
            self.title.trim().to_string()
        } else {
            format!("{}: {}", self.title.trim(), self.subtitle.trim())
        }
    }

    /// First serial number of the given kind, if any.
    pub fn serial(&self, kind: SerialKind) -> Option<&str> {
        self.serial_numbers
            .iter()
            .find(|sn| sn.kind == kind)
            .map(|sn| sn.value.as_str())
    }
}

impl Default for Production {
    fn default() -> Self {
        Self::new(EntryType::Misc)
    }
}

/// Accept numbers where older documents wrote `"year": 2020` instead of a
/// string.
fn stringy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
