// Economic Data Prep - Core Library
// Builds and checks the data files behind the economy visualizer:
// merge gdp/gdppc/inflation, validate country names, check map coverage.

pub mod config;
pub mod coverage;
pub mod entities;
pub mod error;
pub mod format;
pub mod loader;
pub mod merge;
pub mod records;
pub mod validate;

// Re-export commonly used types
pub use config::PrepConfig;
pub use coverage::{
    check_coverage, missing_countries, record_countries, topology_countries, CoverageReport,
};
pub use entities::{Country, CountryRegistry, Lookup};
pub use error::{PrepError, Result};
pub use format::{format_metric, format_number};
pub use loader::{load_json, write_json_pretty};
pub use merge::{
    merge_data, merge_files, merge_sources, MergePaths, MergeStats, MergedData, Metric,
    MetricSource, MetricValues,
};
pub use records::{extract_records, Record};
pub use validate::{validate_document, validate_names, ValidationReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
