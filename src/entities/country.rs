// 🌍 Country Entity - ISO 3166-1 registry
//
// "Czechia", "Czech Republic", "CZ", "CZE", "203" → All same country entity
//
// Identity is the alpha-2 code. Every other name (short name, common name,
// official name, extra aliases, alpha-3, numeric) is a VALUE that resolves
// to it. Matching is exact and case-insensitive, first registration wins.

use crate::error::{PrepError, Result};
use crate::loader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Bundled ISO 3166-1 table (iso-codes layout)
const ISO_3166_1: &str = include_str!("../../data/iso3166-1.json");

// ============================================================================
// COUNTRY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Stable identity (ISO 3166-1 alpha-2)
    pub alpha_2: String,

    pub alpha_3: String,

    /// Zero-padded numeric code, e.g. "068"
    pub numeric: String,

    /// Short name as listed by ISO ("Bolivia, Plurinational State of")
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_name: Option<String>,

    /// Everyday name ("Bolivia")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    /// Extra names carried by custom registry files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Country {
    pub fn new(alpha_2: &str, alpha_3: &str, numeric: &str, name: &str) -> Self {
        Country {
            alpha_2: alpha_2.to_string(),
            alpha_3: alpha_3.to_string(),
            numeric: numeric.to_string(),
            name: name.to_string(),
            official_name: None,
            common_name: None,
            aliases: Vec::new(),
        }
    }

    /// Add an alias to this country
    pub fn add_alias(&mut self, alias: String) {
        if !self.aliases.contains(&alias) && alias != self.name {
            self.aliases.push(alias);
        }
    }

    /// Every key this country answers to, in lookup priority order
    pub fn all_keys(&self) -> Vec<&str> {
        let mut keys = vec![self.alpha_2.as_str(), self.alpha_3.as_str(), self.numeric.as_str(), self.name.as_str()];
        keys.extend(self.official_name.as_deref());
        keys.extend(self.common_name.as_deref());
        keys.extend(self.aliases.iter().map(String::as_str));
        keys
    }

    /// Names a dataset may use for this country (no codes)
    pub fn display_names(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        names.extend(self.common_name.as_deref());
        names.extend(self.official_name.as_deref());
        names.extend(self.aliases.iter().map(String::as_str));
        names
    }
}

// ============================================================================
// LOOKUP RESULT
// ============================================================================

/// Outcome of a registry lookup; a miss is a value, not an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Valid(&'a Country),
    Invalid,
}

impl<'a> Lookup<'a> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Lookup::Valid(_))
    }

    pub fn country(&self) -> Option<&'a Country> {
        match self {
            Lookup::Valid(country) => Some(country),
            Lookup::Invalid => None,
        }
    }
}

// ============================================================================
// COUNTRY REGISTRY
// ============================================================================

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(rename = "3166-1")]
    countries: Vec<Country>,
}

/// Registry of all known countries
#[derive(Debug)]
pub struct CountryRegistry {
    countries: Vec<Country>,

    /// lowercased key → position in `countries`
    index: HashMap<String, usize>,
}

impl CountryRegistry {
    /// Registry from the bundled ISO 3166-1 table
    pub fn iso3166() -> Result<Self> {
        Self::from_json_str(ISO_3166_1)
    }

    /// Registry from a file using the same `{"3166-1": [...]}` layout
    pub fn load(path: &Path) -> Result<Self> {
        let doc = loader::load_json(path)?;
        let file: RegistryFile = serde_json::from_value(doc).map_err(|source| PrepError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_file(file)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: RegistryFile =
            serde_json::from_str(text).map_err(|e| PrepError::Registry(e.to_string()))?;
        Self::from_file(file)
    }

    fn from_file(file: RegistryFile) -> Result<Self> {
        if file.countries.is_empty() {
            return Err(PrepError::Registry("no countries listed".to_string()));
        }

        Ok(Self::from_countries(file.countries))
    }

    pub fn from_countries(countries: Vec<Country>) -> Self {
        let mut registry = CountryRegistry {
            countries: Vec::with_capacity(countries.len()),
            index: HashMap::new(),
        };

        for country in countries {
            registry.register(country);
        }

        tracing::debug!(countries = registry.count(), keys = registry.index.len(), "country registry ready");
        registry
    }

    /// Register a country; keys already claimed by an earlier entry are kept
    pub fn register(&mut self, country: Country) {
        let position = self.countries.len();
        for key in country.all_keys() {
            self.index.entry(key.to_lowercase()).or_insert(position);
        }
        self.countries.push(country);
    }

    /// Exact, case-insensitive match on code or any listed name
    ///
    /// Numeric codes must be given in full: "068" matches, "68" does not.
    pub fn lookup(&self, name: &str) -> Lookup<'_> {
        match self.index.get(&name.to_lowercase()) {
            Some(&position) => Lookup::Valid(&self.countries[position]),
            None => Lookup::Invalid,
        }
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.lookup(name).is_valid()
    }

    pub fn count(&self) -> usize {
        self.countries.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
