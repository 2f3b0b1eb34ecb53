//! Semantic codec between raw BibTeX entries and productions
//!
//! Decoding interprets the handful of fields the store understands (title
//! split, author list, the per-type publisher-like field, serial numbers)
//! and keeps everything else verbatim as passthrough fields. Encoding walks
//! the other way, restricted to the per-type field tables.

use std::collections::{BTreeMap, HashSet};

use folio_domain::{EntryType, Production, SerialKind, SerialNumber};

use crate::entry::BibtexEntry;
use crate::formatter::{format_entries, format_entry};
use crate::parser::{parse, ParseIssue};

/// Subtitle separators, tried in order on the first occurrence.
const SUBTITLE_SEPARATORS: [&str; 2] = [": ", " – "];

/// Fields interpreted by [`entry_to_production`]; everything else passes
/// through verbatim.
const INTERPRETED_FIELDS: [&str; 9] = [
    "title", "author", "year", "url", "language", "edition", "isbn", "issn", "doi",
];

/// Record field names in the serialized document. A passthrough field with
/// one of these exact keys (e.g. a thesis `type`) would collide with the
/// record's own key when the document is written, so it cannot be kept.
const RESERVED_RECORD_KEYS: [&str; 10] = [
    "type",
    "title",
    "subtitle",
    "authors",
    "year",
    "url",
    "language",
    "version",
    "publicator_name",
    "serial_numbers",
];

/// Outcome of decoding a BibTeX file.
#[derive(Debug, Clone, Default)]
pub struct DecodeResult {
    pub records: BTreeMap<String, Production>,
    pub issues: Vec<ParseIssue>,
}

/// Decode BibTeX text into records keyed by citation key.
///
/// A malformed entry is reported in `issues` and skipped; it never aborts
/// the rest of the file. When a citation key repeats, the last entry wins.
pub fn decode(text: &str) -> DecodeResult {
    let parsed = parse(text);
    let mut result = DecodeResult {
        records: BTreeMap::new(),
        issues: parsed.issues,
    };
    for entry in parsed.entries {
        let id = entry.cite_key.clone();
        result.records.insert(id, entry_to_production(&entry));
    }
    result
}

/// Interpret a raw entry as a production.
pub fn entry_to_production(entry: &BibtexEntry) -> Production {
    let mut prod = Production::new(entry.kind);

    let full_title = entry.field("title").unwrap_or_default().trim();
    let (title, subtitle) = split_title(full_title);
    prod.title = title;
    prod.subtitle = subtitle;

    prod.authors = entry
        .field("author")
        .map(split_authors)
        .unwrap_or_default();

    prod.year = entry.field("year").unwrap_or_default().trim().to_string();
    prod.url = entry.field("url").unwrap_or_default().trim().to_string();
    prod.language = entry.field("language").unwrap_or_default().trim().to_string();
    prod.version = entry.field("edition").unwrap_or_default().trim().to_string();

    if let Some(field) = entry.kind.publicator_field() {
        prod.publicator_name = entry.field(field).unwrap_or_default().trim().to_string();
    }

    for kind in [SerialKind::Isbn, SerialKind::Issn, SerialKind::Doi] {
        if let Some(value) = entry.field(kind.field_name()) {
            let value = value.trim();
            if !value.is_empty() {
                prod.serial_numbers.push(SerialNumber::new(kind, value));
            }
        }
    }

    let publicator_field = entry.kind.publicator_field();
    for field in &entry.fields {
        let key = field.key.to_lowercase();
        let interpreted =
            INTERPRETED_FIELDS.contains(&key.as_str()) || Some(key.as_str()) == publicator_field;
        if interpreted {
            continue;
        }
        if RESERVED_RECORD_KEYS.contains(&field.key.as_str()) {
            tracing::warn!(
                cite_key = %entry.cite_key,
                field = %field.key,
                "dropping passthrough field that shadows a record key"
            );
            continue;
        }
        prod.extra.insert(field.key.clone(), field.value.clone());
    }

    prod
}

/// Map a production back to a raw entry, restricted to the field table of
/// its entry type.
pub fn production_to_entry(prod: &Production, id: &str) -> BibtexEntry {
    let kind = prod.entry_type;
    let mut entry = BibtexEntry::new(id, kind);
    let mut emitted: HashSet<String> = HashSet::new();

    let mut push = |entry: &mut BibtexEntry, key: &str, value: &str| {
        let value = value.trim();
        if value.is_empty() || !kind.allows_field(&key.to_lowercase()) {
            return;
        }
        if emitted.insert(key.to_lowercase()) {
            entry.push_field(key, value);
        }
    };

    push(&mut entry, "author", &prod.authors.join(" and "));
    push(&mut entry, "title", &prod.full_title());

    if let Some(field) = kind.publicator_field() {
        push(&mut entry, field, &prod.publicator_name);
    }

    // The record's version maps to the BibTeX edition, but only books and
    // manuals carry one on export.
    if matches!(kind, EntryType::Book | EntryType::Manual) {
        push(&mut entry, "edition", &prod.version);
    }

    push(&mut entry, "year", &prod.year);
    push(&mut entry, "url", &prod.url);
    push(&mut entry, "language", &prod.language);

    for kind_ in [SerialKind::Isbn, SerialKind::Issn, SerialKind::Doi] {
        if let Some(value) = prod.serial(kind_) {
            push(&mut entry, kind_.field_name(), value);
        }
    }

    for (key, value) in &prod.extra {
        push(&mut entry, key, value);
    }

    entry
}

/// Encode one record as BibTeX text.
pub fn encode(prod: &Production, id: &str) -> String {
    format_entry(&production_to_entry(prod, id))
}

/// Encode records in the caller-supplied order, separated by blank lines.
pub fn encode_all<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Production)>,
{
    let entries: Vec<BibtexEntry> = pairs
        .into_iter()
        .map(|(id, prod)| production_to_entry(prod, id))
        .collect();
    format_entries(&entries)
}

/// Split a full title into title and subtitle on the first `": "`, else the
/// first `" – "`. Best-effort: titles that legitimately contain a colon
/// cannot be told apart from subtitled ones.
fn split_title(full: &str) -> (String, String) {
    for sep in SUBTITLE_SEPARATORS {
        if let Some((title, subtitle)) = full.split_once(sep) {
            return (title.trim().to_string(), subtitle.trim().to_string());
        }
    }
    (full.to_string(), String::new())
}

/// Split an author field on the literal `" and "` separator.
fn split_authors(field: &str) -> Vec<String> {
    field
        .split(" and ")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::ALL_ENTRY_TYPES;
    use rstest::rstest;

    fn decode_one(text: &str, id: &str) -> Production {
        let result = decode(text);
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        result.records.get(id).cloned().expect("record missing")
    }

    #[test]
    fn test_decode_article() {
        let prod = decode_one(
            "@article{k1, title = {Foo: Bar}, author = {A and B}, journal = {J}, year = {2020}}",
            "k1",
        );
        assert_eq!(prod.entry_type, EntryType::Article);
        assert_eq!(prod.title, "Foo");
        assert_eq!(prod.subtitle, "Bar");
        assert_eq!(prod.authors, ["A", "B"]);
        assert_eq!(prod.publicator_name, "J");
        assert_eq!(prod.year, "2020");
    }

    #[test]
    fn test_decode_en_dash_subtitle() {
        let prod = decode_one("@misc{k, title = {Foo – Bar}}", "k");
        assert_eq!(prod.title, "Foo");
        assert_eq!(prod.subtitle, "Bar");
    }

    #[test]
    fn test_colon_takes_precedence_over_en_dash() {
        let prod = decode_one("@misc{k, title = {A – B: C}}", "k");
        assert_eq!(prod.title, "A – B");
        assert_eq!(prod.subtitle, "C");
    }

    #[test]
    fn test_decode_defaults_missing_fields_to_empty() {
        let prod = decode_one("@article{k, title = {T}}", "k");
        assert_eq!(prod.year, "");
        assert_eq!(prod.url, "");
        assert_eq!(prod.language, "");
        assert_eq!(prod.publicator_name, "");
        assert!(prod.authors.is_empty());
        assert!(prod.serial_numbers.is_empty());
    }

    #[test]
    fn test_decode_serial_numbers_in_field_order() {
        let prod = decode_one(
            "@book{k, title = {T}, doi = {10.1/x}, isbn = {978-1}, issn = { }}",
            "k",
        );
        let kinds: Vec<SerialKind> = prod.serial_numbers.iter().map(|sn| sn.kind).collect();
        assert_eq!(kinds, [SerialKind::Isbn, SerialKind::Doi]);
        assert_eq!(prod.serial(SerialKind::Isbn), Some("978-1"));
    }

    #[test]
    fn test_decode_passthrough_keeps_unknown_fields() {
        let prod = decode_one(
            "@article{k, title = {T}, volume = {12}, keywords = {a, b}}",
            "k",
        );
        assert_eq!(prod.extra.get("volume").map(String::as_str), Some("12"));
        assert_eq!(prod.extra.get("keywords").map(String::as_str), Some("a, b"));
    }

    #[test]
    fn test_decode_publisher_field_not_passthrough_for_other_types() {
        // An article's `publisher` is not its publicator field, so it rides
        // along as passthrough instead.
        let prod = decode_one("@article{k, title = {T}, publisher = {P}}", "k");
        assert_eq!(prod.publicator_name, "");
        assert_eq!(prod.extra.get("publisher").map(String::as_str), Some("P"));
    }

    #[test]
    fn test_decode_drops_passthrough_shadowing_record_keys() {
        // A thesis `type` field would collide with the record's own `type`
        // key in the serialized document.
        let prod = decode_one("@phdthesis{k, title = {T}, type = {PhD dissertation}}", "k");
        assert!(prod.extra.is_empty());
        // Different spelling does not collide; JSON keys are case-sensitive.
        let prod = decode_one("@phdthesis{k, title = {T}, Type = {PhD dissertation}}", "k");
        assert_eq!(
            prod.extra.get("Type").map(String::as_str),
            Some("PhD dissertation")
        );
    }

    #[test]
    fn test_decode_duplicate_cite_key_last_wins() {
        let result = decode("@misc{k, title = {One}}\n@misc{k, title = {Two}}");
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records["k"].title, "Two");
    }

    #[rstest]
    #[case(EntryType::Article, "journal")]
    #[case(EntryType::Book, "publisher")]
    #[case(EntryType::InProceedings, "booktitle")]
    #[case(EntryType::TechReport, "institution")]
    #[case(EntryType::Manual, "organization")]
    #[case(EntryType::PhdThesis, "school")]
    #[case(EntryType::MastersThesis, "school")]
    fn test_publicator_round_trips_per_type(#[case] kind: EntryType, #[case] field: &str) {
        let mut prod = Production::new(kind);
        prod.title = "T".to_string();
        prod.publicator_name = "Somewhere".to_string();
        let entry = production_to_entry(&prod, "k");
        assert_eq!(entry.field(field), Some("Somewhere"));
        assert_eq!(entry_to_production(&entry).publicator_name, "Somewhere");
    }

    #[test]
    fn test_encode_restricts_to_allow_list() {
        let mut prod = Production::new(EntryType::Article);
        prod.title = "T".to_string();
        prod.extra.insert("volume".to_string(), "12".to_string());
        prod.extra.insert("keywords".to_string(), "a, b".to_string());
        let entry = production_to_entry(&prod, "k");
        // `volume` is in the article table, `keywords` is not.
        assert_eq!(entry.field("volume"), Some("12"));
        assert_eq!(entry.field("keywords"), None);
    }

    #[test]
    fn test_encode_omits_empty_and_whitespace_fields() {
        let mut prod = Production::new(EntryType::Article);
        prod.title = "T".to_string();
        prod.year = "  ".to_string();
        prod.url = String::new();
        let entry = production_to_entry(&prod, "k");
        assert_eq!(entry.field("year"), None);
        assert_eq!(entry.field("url"), None);
    }

    #[test]
    fn test_encode_language_is_never_emitted() {
        for kind in ALL_ENTRY_TYPES {
            let mut prod = Production::new(kind);
            prod.title = "T".to_string();
            prod.language = "English".to_string();
            assert_eq!(production_to_entry(&prod, "k").field("language"), None);
        }
    }

    #[test]
    fn test_encode_version_becomes_edition_for_book_and_manual_only() {
        for kind in ALL_ENTRY_TYPES {
            let mut prod = Production::new(kind);
            prod.title = "T".to_string();
            prod.version = "3".to_string();
            let entry = production_to_entry(&prod, "k");
            if matches!(kind, EntryType::Book | EntryType::Manual) {
                assert_eq!(entry.field("edition"), Some("3"), "{kind}");
            } else {
                assert_eq!(entry.field("edition"), None, "{kind}");
            }
        }
    }

    #[test]
    fn test_encode_serials_gated_by_allow_list() {
        let mut prod = Production::new(EntryType::Article);
        prod.title = "T".to_string();
        prod.serial_numbers = vec![
            SerialNumber::new(SerialKind::Isbn, "978-1"),
            SerialNumber::new(SerialKind::Issn, "1234-5678"),
            SerialNumber::new(SerialKind::Doi, "10.1/x"),
        ];
        let entry = production_to_entry(&prod, "k");
        assert_eq!(entry.field("isbn"), None);
        assert_eq!(entry.field("issn"), Some("1234-5678"));
        assert_eq!(entry.field("doi"), Some("10.1/x"));
    }

    #[test]
    fn test_encode_joins_title_and_authors() {
        let mut prod = Production::new(EntryType::Article);
        prod.title = "Foo".to_string();
        prod.subtitle = "Bar".to_string();
        prod.authors = vec!["A".to_string(), "B".to_string()];
        let entry = production_to_entry(&prod, "k");
        assert_eq!(entry.field("title"), Some("Foo: Bar"));
        assert_eq!(entry.field("author"), Some("A and B"));
    }

    #[test]
    fn test_encode_all_preserves_caller_order() {
        let mut a = Production::new(EntryType::Misc);
        a.title = "A".to_string();
        let mut b = Production::new(EntryType::Misc);
        b.title = "B".to_string();
        let text = encode_all([("zzz", &a), ("aaa", &b)]);
        let first = text.find("@misc{zzz").unwrap();
        let second = text.find("@misc{aaa").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_scoped_round_trip() {
        let mut prod = Production::new(EntryType::Article);
        prod.title = "Foo".to_string();
        prod.subtitle = "Bar".to_string();
        prod.authors = vec!["Ada Lovelace".to_string(), "Alan Turing".to_string()];
        prod.year = "2020".to_string();
        prod.url = "https://example.com/p".to_string();
        prod.publicator_name = "Nature".to_string();
        prod.serial_numbers = vec![SerialNumber::new(SerialKind::Doi, "10.1000/xyz")];

        let text = encode(&prod, "k1");
        let back = decode(&text).records.remove("k1").unwrap();
        assert_eq!(back, prod);
    }
}
