// ⚙️ Configuration - where the data files live
//
// Every input/output defaults to the file name the visualizer's data folder
// uses; relative overrides are resolved against the data directory.

use std::path::{Path, PathBuf};

pub const GDP_FILE: &str = "gdp.json";
pub const GDPPC_FILE: &str = "gdppc.json";
pub const INFLATION_FILE: &str = "inflation.json";
pub const TOPOLOGY_FILE: &str = "countries-50m.json";
pub const MERGED_FILE: &str = "merged_data.json";

/// Environment variable for the data directory
pub const DATA_DIR_ENV: &str = "ECON_PREP_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepConfig {
    pub data_dir: PathBuf,
}

impl PrepConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        PrepConfig {
            data_dir: data_dir.into(),
        }
    }

    /// Absolute paths are kept, relative ones join the data directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    /// `explicit` if given, otherwise `default_name`, resolved
    pub fn path_or(&self, explicit: Option<&Path>, default_name: &str) -> PathBuf {
        self.resolve(explicit.unwrap_or_else(|| Path::new(default_name)))
    }
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
