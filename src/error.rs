// ⚠️ Error taxonomy for the prep pipelines
//
// Only a country-name miss is "expected" and that one is NOT an error:
// it comes back as Lookup::Invalid. Everything here aborts the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    /// Input path missing or unreadable
    #[error("failed to open {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content is not valid JSON
    #[error("failed to parse JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Record field list shorter than [country, _, year, value]
    #[error("malformed record #{index} in {source_name}: expected 4 fields, found {len}")]
    MalformedRecord {
        source_name: String,
        index: usize,
        len: usize,
    },

    /// Output could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Registry table could not be built
    #[error("invalid country registry: {0}")]
    Registry(String),
}

pub type Result<T> = std::result::Result<T, PrepError>;
