//! BibTeX formatting
//!
//! Converts raw entries back to BibTeX text.

use crate::entry::BibtexEntry;

/// Format a single entry to BibTeX text.
pub fn format_entry(entry: &BibtexEntry) -> String {
    let mut out = String::new();
    out.push('@');
    out.push_str(entry.kind.as_str());
    out.push('{');
    out.push_str(&entry.cite_key);
    out.push_str(",\n");

    for field in &entry.fields {
        out.push_str("    ");
        out.push_str(&field.key);
        out.push_str(" = ");
        out.push_str(&delimit(&field.value));
        out.push_str(",\n");
    }

    out.push('}');
    out
}

/// Format multiple entries, separated by a blank line, in the given order.
pub fn format_entries<'a>(entries: impl IntoIterator<Item = &'a BibtexEntry>) -> String {
    entries
        .into_iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Bare numbers stay undelimited; everything else is braced so LaTeX markup
/// survives untouched.
fn delimit(value: &str) -> String {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        value.to_string()
    } else {
        format!("{{{value}}}")
    }
}
