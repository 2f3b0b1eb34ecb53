//! Bulk BibTeX import and export
//!
//! Import is best-effort: a malformed entry or a colliding ID never aborts
//! the batch; both are reported instead. Export walks the depth-first
//! listing order of the addressed folder, or a single record for a leaf
//! path.

use folio_bibtex::codec;
use folio_domain::validate_production;

use crate::error::StoreError;
use crate::path::TreePath;
use crate::store::PublicationStore;

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// IDs inserted, in insertion order.
    pub imported: Vec<String>,
    /// IDs skipped because they collided with an existing record or sibling.
    pub skipped: Vec<String>,
    /// Validation warnings for imported records (`id: field - message`).
    pub warnings: Vec<String>,
    /// Recovered parse failures (`line N: message`).
    pub errors: Vec<String>,
}

impl PublicationStore {
    /// Decode `text` and insert every record under the folder at `parent`.
    ///
    /// Colliding IDs are skipped and reported rather than failing the batch;
    /// per-entry parse failures come back as `errors`. Dangling markers are
    /// garbage-collected afterwards, as after any bulk change.
    pub fn import_bibtex(
        &mut self,
        parent: &TreePath,
        text: &str,
    ) -> Result<ImportReport, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::InvalidArgument(
                "empty BibTeX input".to_string(),
            ));
        }
        // Resolve before decoding so a bad path fails fast and clean.
        self.resolve_import_folder(parent)?;

        let decoded = codec::decode(text);
        let mut report = ImportReport {
            errors: decoded
                .issues
                .iter()
                .map(|issue| format!("line {}: {}", issue.line, issue.message))
                .collect(),
            ..ImportReport::default()
        };

        for (id, production) in decoded.records {
            for issue in validate_production(&production) {
                report
                    .warnings
                    .push(format!("{id}: {} - {}", issue.field, issue.message));
            }
            match self.create_record(parent, &id, production) {
                Ok(()) => report.imported.push(id),
                Err(StoreError::IdCollision(_)) | Err(StoreError::NameCollision(_)) => {
                    report.skipped.push(id);
                }
                Err(err) => return Err(err),
            }
        }

        self.garbage_collect();
        tracing::debug!(
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            "imported BibTeX batch"
        );
        Ok(report)
    }

    /// Export the folder or record at `path` as BibTeX text, one entry per
    /// record, separated by blank lines, in depth-first listing order.
    pub fn export_bibtex(&self, path: &TreePath) -> Result<String, StoreError> {
        let listed = self.list_records_under(path)?;
        let pairs = listed
            .iter()
            .filter_map(|(id, _)| self.record(id).map(|record| (id.as_str(), record)));
        Ok(codec::encode_all(pairs))
    }

    fn resolve_import_folder(&self, parent: &TreePath) -> Result<(), StoreError> {
        if self.root().resolve_folder(parent).is_none() {
            return Err(StoreError::NotFound(parent.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::{EntryType, Production};

    #[test]
    fn test_import_creates_records_under_folder() {
        let mut store = PublicationStore::new();
        store.create_folder(&TreePath::root(), "Imported").unwrap();

        let text = r#"
@article{k1, title = {Foo: Bar}, author = {A and B}, journal = {J}, year = {2020}}
@book{k2, title = {A Book}, publisher = {P}, year = {1999}}
"#;
        let report = store
            .import_bibtex(&TreePath::from(["Imported"]), text)
            .unwrap();
        assert_eq!(report.imported, ["k1", "k2"]);
        assert!(report.skipped.is_empty());
        assert!(report.errors.is_empty());

        let k1 = store.record("k1").unwrap();
        assert_eq!(k1.entry_type, EntryType::Article);
        assert_eq!(k1.title, "Foo");
        assert_eq!(k1.subtitle, "Bar");
        assert_eq!(k1.publicator_name, "J");
        assert!(store
            .resolve_path(&TreePath::from(["Imported", "k2"]))
            .unwrap()
            .is_leaf());
    }

    #[test]
    fn test_import_skips_colliding_ids() {
        let mut store = PublicationStore::new();
        store
            .create_record(&TreePath::root(), "k1", Production::default())
            .unwrap();

        let report = store
            .import_bibtex(&TreePath::root(), "@misc{k1, title = {Again}}")
            .unwrap();
        assert!(report.imported.is_empty());
        assert_eq!(report.skipped, ["k1"]);
        // The existing record stayed untouched.
        assert_eq!(store.record("k1").unwrap().title, "");
    }

    #[test]
    fn test_import_reports_parse_errors_and_keeps_good_entries() {
        let mut store = PublicationStore::new();
        let text = "@article{bad, title = {unterminated\n@misc{good, title = {Fine}}";
        let report = store.import_bibtex(&TreePath::root(), text).unwrap();
        assert_eq!(report.imported, ["good"]);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("line 1"));
    }

    #[test]
    fn test_import_collects_validation_warnings() {
        let mut store = PublicationStore::new();
        let report = store
            .import_bibtex(&TreePath::root(), "@article{k, title = {T}}")
            .unwrap();
        assert!(report.warnings.iter().any(|w| w.contains("authors")));
        assert!(report.warnings.iter().any(|w| w.contains("journal")));
    }

    #[test]
    fn test_import_rejects_empty_input_and_bad_path() {
        let mut store = PublicationStore::new();
        assert!(matches!(
            store.import_bibtex(&TreePath::root(), "  "),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.import_bibtex(&TreePath::from(["Nope"]), "@misc{k, title={T}}"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_export_folder_in_listing_order() {
        let mut store = PublicationStore::new();
        store.create_folder(&TreePath::root(), "A").unwrap();
        let mut b = Production::new(EntryType::Misc);
        b.title = "B".to_string();
        let mut a = Production::new(EntryType::Misc);
        a.title = "A".to_string();
        store
            .create_record(&TreePath::from(["A"]), "zeta", b)
            .unwrap();
        store
            .create_record(&TreePath::from(["A"]), "alpha", a)
            .unwrap();

        let text = store.export_bibtex(&TreePath::from(["A"])).unwrap();
        let alpha = text.find("@misc{alpha").unwrap();
        let zeta = text.find("@misc{zeta").unwrap();
        assert!(alpha < zeta);
        assert_eq!(text.matches("@misc").count(), 2);
    }

    #[test]
    fn test_export_single_record_for_leaf_path() {
        let mut store = PublicationStore::new();
        store.create_folder(&TreePath::root(), "A").unwrap();
        let mut prod = Production::new(EntryType::Article);
        prod.title = "T".to_string();
        prod.publicator_name = "J".to_string();
        store.create_record(&TreePath::from(["A"]), "k1", prod).unwrap();

        let text = store.export_bibtex(&TreePath::from(["A", "k1"])).unwrap();
        assert!(text.starts_with("@article{k1,"));
        assert!(text.contains("journal = {J}"));
    }

    #[test]
    fn test_import_then_export_round_trip() {
        let mut store = PublicationStore::new();
        let text = "@article{k1, author = {Ada Lovelace}, title = {Notes}, journal = {Taylor}, year = {1843}}";
        store.import_bibtex(&TreePath::root(), text).unwrap();
        let out = store.export_bibtex(&TreePath::root()).unwrap();

        let mut reimported = PublicationStore::new();
        reimported.import_bibtex(&TreePath::root(), &out).unwrap();
        assert_eq!(reimported.record("k1"), store.record("k1"));
    }
}
