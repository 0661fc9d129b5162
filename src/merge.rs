// 🔀 Merger - gdp + gdppc + inflation → country → year → metrics
//
// Sources are folded in a fixed order. Each source owns exactly one Metric
// key, so the pass order does not change the result. If two passes ever
// write the same metric for the same country/year, last write wins and the
// overwrite is counted + logged.

use crate::entities::CountryRegistry;
use crate::error::{PrepError, Result};
use crate::loader;
use crate::records::{self, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// METRIC
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Gross domestic product
    Gdp,

    /// GDP per capita
    Gdppc,

    /// Inflation rate (%)
    Inflation,
}

impl Metric {
    /// Fixed merge order
    pub const ALL: [Metric; 3] = [Metric::Gdp, Metric::Gdppc, Metric::Inflation];

    /// Key used in the merged document
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Gdp => "gdp",
            Metric::Gdppc => "gdppc",
            Metric::Inflation => "inflation",
        }
    }

    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Gdp => "GDP",
            Metric::Gdppc => "GDPPC",
            Metric::Inflation => "INFLATION",
        }
    }
}

/// Metric values recorded for one country/year (any subset of the three)
pub type MetricValues = BTreeMap<Metric, Value>;

// ============================================================================
// MERGED DATA
// ============================================================================

/// country → year → metric → value
///
/// Serializes to exactly the nested object the visualizer loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedData {
    countries: BTreeMap<String, BTreeMap<String, MetricValues>>,
}

impl MergedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `metric` for `country`/`year`, creating the intermediate levels
    ///
    /// Returns the previous value of that metric, if any.
    pub fn upsert(&mut self, country: &str, year: &str, metric: Metric, value: Value) -> Option<Value> {
        self.countries
            .entry(country.to_string())
            .or_default()
            .entry(year.to_string())
            .or_default()
            .insert(metric, value)
    }

    /// Fold one source's records into the map under `metric`
    pub fn merge_source(&mut self, metric: Metric, records: &[Record]) -> MergeStats {
        let mut stats = MergeStats::default();

        for record in records {
            stats.records += 1;
            if self
                .upsert(&record.country, &record.year, metric, record.value.clone())
                .is_some()
            {
                stats.overwrites += 1;
                tracing::warn!(
                    country = %record.country,
                    year = %record.year,
                    metric = metric.key(),
                    index = record.index,
                    "metric written twice, keeping last value"
                );
            }
        }

        stats
    }

    pub fn get(&self, country: &str, year: &str) -> Option<&MetricValues> {
        self.countries.get(country)?.get(year)
    }

    pub fn years(&self, country: &str) -> Option<&BTreeMap<String, MetricValues>> {
        self.countries.get(country)
    }

    /// Key under which `name` is stored: exact key first, then any name the
    /// registry lists for the same country ("CZE" → "Czech Republic")
    pub fn resolve_country<'a>(&'a self, registry: &CountryRegistry, name: &str) -> Option<&'a str> {
        if let Some((key, _)) = self.countries.get_key_value(name) {
            return Some(key.as_str());
        }

        let country = registry.lookup(name).country()?;
        country
            .display_names()
            .into_iter()
            .find_map(|candidate| self.countries.get_key_value(candidate))
            .map(|(key, _)| key.as_str())
    }

    /// Country names in sorted order
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    /// Number of country/year entries
    pub fn entry_count(&self) -> usize {
        self.countries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Load a previously written merged document
    pub fn load(path: &Path) -> Result<Self> {
        let doc = loader::load_json(path)?;
        serde_json::from_value(doc).map_err(|source| PrepError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write as pretty JSON (4-space indent)
    pub fn write_json(&self, path: &Path) -> Result<()> {
        loader::write_json_pretty(path, self)
    }

    /// Write a flat table: country,year,gdp,gdppc,inflation
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["country", "year", "gdp", "gdppc", "inflation"])?;

        for (country, years) in &self.countries {
            for (year, values) in years {
                let mut row = vec![country.clone(), year.clone()];
                row.extend(Metric::ALL.iter().map(|m| csv_cell(values.get(m))));
                writer.write_record(&row)?;
            }
        }

        writer.flush().map_err(|source| PrepError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ============================================================================
// MERGE PIPELINE
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records folded in
    pub records: usize,

    /// Writes that replaced an existing value for the same metric
    pub overwrites: usize,
}

impl MergeStats {
    fn absorb(&mut self, other: MergeStats) {
        self.records += other.records;
        self.overwrites += other.overwrites;
    }
}

/// One loaded input document and the metric it provides
pub struct MetricSource<'a> {
    pub metric: Metric,
    pub document: &'a Value,
}

impl<'a> MetricSource<'a> {
    pub fn new(metric: Metric, document: &'a Value) -> Self {
        MetricSource { metric, document }
    }
}

/// Merge the given sources in order
///
/// All records are extracted before anything is merged: a malformed record
/// in any source fails the whole merge.
pub fn merge_sources(sources: &[MetricSource<'_>]) -> Result<(MergedData, MergeStats)> {
    let extracted = sources
        .iter()
        .map(|source| {
            records::extract_records(source.document, source.metric.key())
                .map(|records| (source.metric, records))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut merged = MergedData::new();
    let mut stats = MergeStats::default();

    for (metric, records) in &extracted {
        let source_stats = merged.merge_source(*metric, records);
        tracing::info!(
            metric = metric.key(),
            records = source_stats.records,
            "merged source"
        );
        stats.absorb(source_stats);
    }

    Ok((merged, stats))
}

/// gdp, then gdppc, then inflation
pub fn merge_data(gdp: &Value, gdppc: &Value, inflation: &Value) -> Result<(MergedData, MergeStats)> {
    merge_sources(&[
        MetricSource::new(Metric::Gdp, gdp),
        MetricSource::new(Metric::Gdppc, gdppc),
        MetricSource::new(Metric::Inflation, inflation),
    ])
}

/// Files read and written by one merge run
#[derive(Debug, Clone, Copy)]
pub struct MergePaths<'a> {
    pub gdp: &'a Path,
    pub gdppc: &'a Path,
    pub inflation: &'a Path,
    pub output: &'a Path,
}

/// Load the three sources, merge them and write the merged JSON
///
/// Every input is loaded and merged before `output` is touched: a missing
/// file or a malformed record leaves no output behind.
pub fn merge_files(paths: &MergePaths<'_>) -> Result<(MergedData, MergeStats)> {
    let gdp = loader::load_json(paths.gdp)?;
    let gdppc = loader::load_json(paths.gdppc)?;
    let inflation = loader::load_json(paths.inflation)?;

    let (merged, stats) = merge_data(&gdp, &gdppc, &inflation)?;
    merged.write_json(paths.output)?;

    tracing::info!(
        output = %paths.output.display(),
        countries = merged.country_count(),
        entries = merged.entry_count(),
        "merged data written"
    );
    Ok((merged, stats))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn doc(records: Value) -> Value {
        json!({"Root": {"data": {"record": records}}})
    }

    fn rec(country: &str, year: &str, value: Value) -> Value {
        json!({"field": [country, "x", year, value]})
    }

    #[test]
    fn test_france_without_inflation() {
        let gdp = doc(json!([rec("France", "2020", json!(2600))]));
        let gdppc = doc(json!([rec("France", "2020", json!(40000))]));
        let inflation = doc(json!([]));

        let (merged, stats) = merge_data(&gdp, &gdppc, &inflation).unwrap();

        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!({"France": {"2020": {"gdp": 2600, "gdppc": 40000}}})
        );
        assert_eq!(stats, MergeStats { records: 2, overwrites: 0 });
    }

    #[test]
    fn test_all_three_metrics_present() {
        let gdp = doc(json!([rec("Chile", "2010", json!(1.0))]));
        let gdppc = doc(json!([rec("Chile", "2010", json!(2.0))]));
        let inflation = doc(json!([rec("Chile", "2010", json!(3.0))]));

        let (merged, _) = merge_data(&gdp, &gdppc, &inflation).unwrap();
        let values = merged.get("Chile", "2010").unwrap();

        let keys: Vec<Metric> = values.keys().copied().collect();
        assert_eq!(keys, Metric::ALL.to_vec());
        assert_eq!(values[&Metric::Gdp], json!(1.0));
        assert_eq!(values[&Metric::Gdppc], json!(2.0));
        assert_eq!(values[&Metric::Inflation], json!(3.0));
    }

    #[test]
    fn test_disjoint_countries_union() {
        let gdp = doc(json!([rec("France", "2020", json!(1)), rec("Chile", "2020", json!(1))]));
        let gdppc = doc(json!([rec("Peru", "2020", json!(1))]));
        let inflation = doc(json!([rec("Japan", "2001", json!(1))]));

        let (merged, _) = merge_data(&gdp, &gdppc, &inflation).unwrap();

        let keys: BTreeSet<&str> = merged.countries().collect();
        let expected: BTreeSet<&str> = ["France", "Chile", "Peru", "Japan"].into_iter().collect();
        assert_eq!(keys, expected);
        assert_eq!(merged.entry_count(), 4);
    }

    #[test]
    fn test_pass_order_does_not_matter() {
        let gdp = doc(json!([rec("France", "2020", json!(1)), rec("Peru", "1999", json!(5))]));
        let gdppc = doc(json!([rec("France", "2020", json!(2))]));
        let inflation = doc(json!([rec("France", "2021", json!(3)), rec("Peru", "1999", json!(7))]));

        let (forward, _) = merge_data(&gdp, &gdppc, &inflation).unwrap();
        let (reversed, _) = merge_sources(&[
            MetricSource::new(Metric::Inflation, &inflation),
            MetricSource::new(Metric::Gdppc, &gdppc),
            MetricSource::new(Metric::Gdp, &gdp),
        ])
        .unwrap();

        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_repeated_metric_last_write_wins() {
        let gdp = doc(json!([
            rec("France", "2020", json!(1)),
            rec("France", "2020", json!(2)),
        ]));

        let (merged, stats) = merge_data(&gdp, &json!({}), &json!({})).unwrap();

        assert_eq!(merged.get("France", "2020").unwrap()[&Metric::Gdp], json!(2));
        assert_eq!(stats.overwrites, 1);
    }

    #[test]
    fn test_malformed_record_fails_merge() {
        let gdp = doc(json!([rec("France", "2020", json!(1))]));
        let inflation = doc(json!([{"field": ["France", "x"]}]));

        let err = merge_data(&gdp, &json!({}), &inflation).unwrap_err();
        assert!(matches!(
            err,
            PrepError::MalformedRecord { ref source_name, index: 0, len: 2 } if source_name == "inflation"
        ));
    }

    #[test]
    fn test_missing_paths_merge_to_empty() {
        let (merged, stats) = merge_data(&json!({}), &json!({"Root": {}}), &json!([])).unwrap();
        assert!(merged.is_empty());
        assert_eq!(stats.records, 0);
    }

    #[test]
    fn test_upsert_creates_levels() {
        let mut merged = MergedData::new();
        assert!(merged.upsert("Peru", "2000", Metric::Gdp, json!(1)).is_none());
        assert!(merged.upsert("Peru", "2001", Metric::Gdp, json!(2)).is_none());
        assert_eq!(merged.upsert("Peru", "2000", Metric::Gdp, json!(3)), Some(json!(1)));

        assert_eq!(merged.years("Peru").unwrap().len(), 2);
    }

    #[test]
    fn test_resolve_country_through_registry() {
        let registry = CountryRegistry::iso3166().unwrap();
        let mut merged = MergedData::new();
        merged.upsert("Czech Republic", "2020", Metric::Gdp, json!(1));
        merged.upsert("World", "2020", Metric::Gdp, json!(2));

        assert_eq!(merged.resolve_country(&registry, "World"), Some("World"));
        assert_eq!(merged.resolve_country(&registry, "Czechia"), Some("Czech Republic"));
        assert_eq!(merged.resolve_country(&registry, "cze"), Some("Czech Republic"));
        assert_eq!(merged.resolve_country(&registry, "France"), None);
        assert_eq!(merged.resolve_country(&registry, "Narnia"), None);
    }

    struct MergeDir {
        dir: tempfile::TempDir,
    }

    impl MergeDir {
        fn new() -> Self {
            MergeDir { dir: tempdir().unwrap() }
        }

        fn path(&self, name: &str) -> std::path::PathBuf {
            self.dir.path().join(name)
        }

        fn write(&self, name: &str, doc: &Value) {
            std::fs::write(self.path(name), doc.to_string()).unwrap();
        }

        fn merge(&self) -> Result<(MergedData, MergeStats)> {
            let (gdp, gdppc, inflation, output) = (
                self.path("gdp.json"),
                self.path("gdppc.json"),
                self.path("inflation.json"),
                self.path("merged_data.json"),
            );
            merge_files(&MergePaths {
                gdp: &gdp,
                gdppc: &gdppc,
                inflation: &inflation,
                output: &output,
            })
        }
    }

    #[test]
    fn test_merge_files_writes_output() {
        let files = MergeDir::new();
        files.write("gdp.json", &doc(json!([rec("France", "2020", json!(2600))])));
        files.write("gdppc.json", &doc(json!([rec("France", "2020", json!(40000))])));
        files.write("inflation.json", &doc(json!([])));

        let (merged, stats) = files.merge().unwrap();

        assert_eq!(stats.records, 2);
        assert_eq!(MergedData::load(&files.path("merged_data.json")).unwrap(), merged);
    }

    #[test]
    fn test_merge_files_short_record_writes_nothing() {
        let files = MergeDir::new();
        files.write("gdp.json", &doc(json!([rec("France", "2020", json!(2600))])));
        files.write("gdppc.json", &doc(json!([{"field": ["France", "x", "2020"]}])));
        files.write("inflation.json", &doc(json!([])));

        let err = files.merge().unwrap_err();

        assert!(matches!(err, PrepError::MalformedRecord { len: 3, .. }));
        assert!(!files.path("merged_data.json").exists());
    }

    #[test]
    fn test_merge_files_missing_input_writes_nothing() {
        let files = MergeDir::new();
        files.write("gdp.json", &doc(json!([rec("France", "2020", json!(2600))])));
        files.write("gdppc.json", &doc(json!([])));

        let err = files.merge().unwrap_err();

        match err {
            PrepError::FileAccess { path, .. } => assert!(path.ends_with("inflation.json")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!files.path("merged_data.json").exists());
    }

    #[test]
    fn test_load_merged_with_unknown_metric_names_path() {
        let files = MergeDir::new();
        files.write("merged_data.json", &json!({"France": {"2020": {"population": 1}}}));

        let err = MergedData::load(&files.path("merged_data.json")).unwrap_err();
        assert!(matches!(err, PrepError::Parse { .. }));
        assert!(err.to_string().contains("merged_data.json"));
    }

    #[test]
    fn test_write_json_and_load_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged_data.json");

        let mut merged = MergedData::new();
        merged.upsert("France", "2020", Metric::Gdp, json!(2600));
        merged.upsert("France", "2020", Metric::Inflation, json!(0.5));
        merged.write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"France\": {\n        \"2020\": {\n            \"gdp\": 2600,"));

        assert_eq!(MergedData::load(&path).unwrap(), merged);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged.csv");

        let mut merged = MergedData::new();
        merged.upsert("France", "2020", Metric::Gdp, json!(2600));
        merged.upsert("France", "2020", Metric::Gdppc, json!(40000));
        merged.upsert("Chile", "2019", Metric::Inflation, Value::Null);
        merged.write_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "country,year,gdp,gdppc,inflation",
                "Chile,2019,,,",
                "France,2020,2600,40000,",
            ]
        );
    }
}
