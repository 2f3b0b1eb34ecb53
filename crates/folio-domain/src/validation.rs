//! Validation for productions

use crate::entry_type::EntryType;
use crate::production::{Production, SerialKind};
use serde::{Deserialize, Serialize};

/// Severity of a validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

/// A validation error or warning for a single field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub severity: ValidationSeverity,
}

impl ValidationIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: ValidationSeverity::Warning,
        }
    }
}

/// Validate a production and return errors/warnings.
pub fn validate_production(production: &Production) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if production.title.trim().is_empty() {
        issues.push(ValidationIssue::error("title", "Title is required"));
    }

    if production.authors.iter().all(|a| a.trim().is_empty()) {
        issues.push(ValidationIssue::warning("authors", "Authors are recommended"));
    }

    if production.year.trim().is_empty() {
        issues.push(ValidationIssue::warning("year", "Year is recommended"));
    }

    // Types with a publisher-like field should carry one.
    if let Some(field) = production.entry_type.publicator_field() {
        if production.publicator_name.trim().is_empty() {
            let noun = match production.entry_type {
                EntryType::Article => "Journal",
                EntryType::PhdThesis | EntryType::MastersThesis => "School",
                EntryType::TechReport => "Institution",
                EntryType::InProceedings => "Booktitle",
                EntryType::Book => "Publisher",
                EntryType::Manual => "Organization",
                _ => "Publisher",
            };
            issues.push(ValidationIssue::warning(
                field,
                format!("{noun} is recommended for {} entries", production.entry_type),
            ));
        }
    }

    for sn in &production.serial_numbers {
        if sn.value.trim().is_empty() {
            issues.push(ValidationIssue::warning(
                sn.kind.field_name(),
                "Serial number has an empty value",
            ));
        } else if sn.kind == SerialKind::Doi && !sn.value.starts_with("10.") {
            issues.push(ValidationIssue::warning(
                "doi",
                "DOI should start with '10.'",
            ));
        }
    }

    issues
}

/// Check that a production has no validation errors (warnings are allowed).
pub fn is_valid(production: &Production) -> bool {
    validate_production(production)
        .iter()
        .all(|i| i.severity != ValidationSeverity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::production::SerialNumber;

    #[test]
    fn test_empty_production_fails() {
        let prod = Production::new(EntryType::Article);
        let issues = validate_production(&prod);
        assert!(issues
            .iter()
            .any(|i| i.field == "title" && i.severity == ValidationSeverity::Error));
        assert!(issues.iter().any(|i| i.field == "journal"));
        assert!(!is_valid(&prod));
    }

    #[test]
    fn test_template_is_valid() {
        for kind in crate::entry_type::ALL_ENTRY_TYPES {
            assert!(is_valid(&Production::template(kind)), "{kind}");
        }
    }

    #[test]
    fn test_doi_shape_warning() {
        let mut prod = Production::template(EntryType::Article);
        prod.serial_numbers = vec![SerialNumber::new(SerialKind::Doi, "doi:10.1/x")];
        let issues = validate_production(&prod);
        assert!(issues.iter().any(|i| i.field == "doi"));
        // Warnings do not make the record invalid.
        assert!(is_valid(&prod));
    }
}
