// 📂 Loader - JSON in, JSON out
//
// Files are read fully and closed before any transformation starts.

use crate::error::{PrepError, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read a JSON document from disk
///
/// # Errors
/// * `FileAccess` - path missing or unreadable
/// * `Parse` - content is not valid JSON
pub fn load_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|source| PrepError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let value = serde_json::from_str(&text).map_err(|source| PrepError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "loaded JSON document");
    Ok(value)
}

/// Serialize with a 4-space indent (same layout as the visualizer's data files)
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write pretty JSON to `path`
///
/// The document is fully serialized before the file is touched, so a
/// serialization failure never leaves a half-written output behind.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_pretty_json(value)?;
    fs::write(path, &bytes).map_err(|source| PrepError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote JSON document");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
