// ✅ Name Validator - partition dataset country names against ISO 3166-1
//
// Aggregates like "World" or "Euro area" land in `invalid`; that is the
// point of the report, not a failure.

use crate::entities::CountryRegistry;
use crate::records;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Names the registry recognizes
    pub valid: BTreeSet<String>,

    /// Names the registry does not recognize
    pub invalid: BTreeSet<String>,
}

impl ValidationReport {
    pub fn valid_sorted(&self) -> Vec<&str> {
        self.valid.iter().map(String::as_str).collect()
    }

    pub fn invalid_sorted(&self) -> Vec<&str> {
        self.invalid.iter().map(String::as_str).collect()
    }

    /// Distinct names seen
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "Names: {} distinct, {} valid, {} not recognized",
            self.total(),
            self.valid.len(),
            self.invalid.len()
        )
    }
}

/// Look every name up once and sort it into valid / invalid
pub fn validate_names<'a, I>(registry: &CountryRegistry, names: I) -> ValidationReport
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = ValidationReport::default();

    for name in names {
        if report.valid.contains(name) || report.invalid.contains(name) {
            continue;
        }

        if registry.lookup(name).is_valid() {
            report.valid.insert(name.to_string());
        } else {
            tracing::debug!(name, "country name not recognized");
            report.invalid.insert(name.to_string());
        }
    }

    report
}

/// Validate the country names of a records document
pub fn validate_document(registry: &CountryRegistry, doc: &Value) -> ValidationReport {
    validate_names(registry, records::country_names(doc))
}

// ============================================================================
// TESTS
// ============================================================================
