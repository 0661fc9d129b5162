// 🧾 Records - typed view over the macroeconomic record documents
//
// Document shape:
//   {"Root": {"data": {"record": [{"field": [country, _, year, value]}, ...]}}}
//
// Positions are resolved ONCE here; the rest of the crate only sees Record.

use crate::error::{PrepError, Result};
use serde_json::Value;

const COUNTRY_POS: usize = 0;
const YEAR_POS: usize = 2;
const VALUE_POS: usize = 3;
const MIN_FIELDS: usize = 4;

// ============================================================================
// CORE TYPES
// ============================================================================

/// One observation about a country in a given year
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub country: String,

    /// Year as it appears in the source, used as a map key
    pub year: String,

    /// Raw value, written back untouched (number, string or null)
    pub value: Value,

    /// Position in the source record list (provenance)
    pub index: usize,
}

impl Record {
    pub fn new(country: impl Into<String>, year: impl Into<String>, value: Value) -> Self {
        Record {
            country: country.into(),
            year: year.into(),
            value,
            index: 0,
        }
    }

    /// Builder: set provenance index
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// The raw record list of a document
///
/// Missing `Root` / `data` / `record` paths yield an empty slice, not an error.
pub fn record_list(doc: &Value) -> &[Value] {
    doc.get("Root")
        .and_then(|root| root.get("data"))
        .and_then(|data| data.get("record"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Render a JSON scalar as a map key (strings verbatim, everything else as JSON text)
pub fn key_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse one `{"field": [...]}` entry
///
/// # Errors
/// `MalformedRecord` when `field` is missing or has fewer than 4 entries.
pub fn parse_record(source_name: &str, index: usize, raw: &Value) -> Result<Record> {
    let fields = raw
        .get("field")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    if fields.len() < MIN_FIELDS {
        return Err(PrepError::MalformedRecord {
            source_name: source_name.to_string(),
            index,
            len: fields.len(),
        });
    }

    Ok(Record::new(
        key_text(&fields[COUNTRY_POS]),
        key_text(&fields[YEAR_POS]),
        fields[VALUE_POS].clone(),
    )
    .with_index(index))
}

/// Extract every record of a document, failing on the first malformed one
pub fn extract_records(doc: &Value, source_name: &str) -> Result<Vec<Record>> {
    let records = record_list(doc)
        .iter()
        .enumerate()
        .map(|(index, raw)| parse_record(source_name, index, raw))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(source = source_name, count = records.len(), "extracted records");
    Ok(records)
}

/// Lenient country-name scan used by the name checks
///
/// Records without a `field` list, with an empty list, or whose first entry
/// is not a non-empty string are skipped.
pub fn country_names(doc: &Value) -> impl Iterator<Item = &str> {
    record_list(doc).iter().filter_map(|raw| {
        raw.get("field")
            .and_then(Value::as_array)
            .and_then(|fields| fields.first())
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    })
}

// ============================================================================
// TESTS
// ============================================================================
