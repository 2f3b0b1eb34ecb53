//! Raw BibTeX entry model

use folio_domain::EntryType;

/// A single field of a raw entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibtexField {
    pub key: String,
    pub value: String,
}

/// A parsed BibTeX entry, before semantic interpretation.
///
/// Fields keep their source order and original key spelling; lookups are
/// case-insensitive. Unknown entry type tokens have already collapsed to
/// `misc` at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibtexEntry {
    pub cite_key: String,
    pub kind: EntryType,
    pub fields: Vec<BibtexField>,
}

impl BibtexEntry {
    pub fn new(cite_key: impl Into<String>, kind: EntryType) -> Self {
        Self {
            cite_key: cite_key.into(),
            kind,
            fields: Vec::new(),
        }
    }

    /// Append a field, keeping source order.
    pub fn push_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push(BibtexField {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Look up a field value by key (case-insensitive).
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key.eq_ignore_ascii_case(key))
            .map(|f| f.value.as_str())
    }
}
