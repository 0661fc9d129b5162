// 🗺️ Coverage Check - map topology vs. records
//
// Reports the countries drawn on the map that have no record in a dataset,
// i.e. shapes the visualizer would render without data.

use crate::records;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Names of `objects.countries.geometries[*].properties.name`
///
/// Geometries without a (non-empty) name are skipped.
pub fn topology_countries(topology: &Value) -> BTreeSet<String> {
    topology
        .get("objects")
        .and_then(|objects| objects.get("countries"))
        .and_then(|countries| countries.get("geometries"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .filter_map(|geometry| {
            geometry
                .get("properties")
                .and_then(|props| props.get("name"))
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
        })
        .map(str::to_string)
        .collect()
}

/// Distinct `field[0]` names of a records document
pub fn record_countries(doc: &Value) -> BTreeSet<String> {
    records::country_names(doc).map(str::to_string).collect()
}

/// topology − records
pub fn missing_countries(topology: &BTreeSet<String>, records: &BTreeSet<String>) -> BTreeSet<String> {
    topology.difference(records).cloned().collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub topology_countries: BTreeSet<String>,
    pub record_countries: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

impl CoverageReport {
    pub fn missing_sorted(&self) -> Vec<&str> {
        self.missing.iter().map(String::as_str).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Map: {} countries, records: {} countries, missing: {}",
            self.topology_countries.len(),
            self.record_countries.len(),
            self.missing.len()
        )
    }
}

pub fn check_coverage(topology: &Value, records: &Value) -> CoverageReport {
    let topology_countries = topology_countries(topology);
    let record_countries = record_countries(records);
    let missing = missing_countries(&topology_countries, &record_countries);

    tracing::debug!(
        topology = topology_countries.len(),
        records = record_countries.len(),
        missing = missing.len(),
        "coverage computed"
    );

    CoverageReport {
        topology_countries,
        record_countries,
        missing,
    }
}

// ============================================================================
// TESTS
// ============================================================================
