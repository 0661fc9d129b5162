use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use econ_prep::config::{
    DATA_DIR_ENV, GDPPC_FILE, GDP_FILE, INFLATION_FILE, MERGED_FILE, TOPOLOGY_FILE,
};
use econ_prep::{
    check_coverage, format_metric, load_json, merge_files, validate_document, CountryRegistry,
    MergePaths, MergedData, Metric, PrepConfig,
};

/// Data preparation for the economy visualizer
#[derive(Parser, Debug)]
#[command(name = "econ-prep", version)]
#[command(about = "Merges and checks the economic datasets behind the world map")]
struct Cli {
    /// Directory holding the data files; relative paths resolve against it
    #[arg(long, global = true, env = DATA_DIR_ENV, default_value = ".")]
    data_dir: PathBuf,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge gdp, gdppc and inflation into one country → year → metrics file
    Merge {
        #[arg(long)]
        gdp: Option<PathBuf>,
        #[arg(long)]
        gdppc: Option<PathBuf>,
        #[arg(long)]
        inflation: Option<PathBuf>,
        /// Merged JSON output
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also write a flat CSV table
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Check record country names against ISO 3166-1
    Validate {
        #[arg(long)]
        records: Option<PathBuf>,
        /// Custom registry file ({"3166-1": [...]})
        #[arg(long)]
        registry: Option<PathBuf>,
    },

    /// List map countries that have no record
    Coverage {
        #[arg(long)]
        topology: Option<PathBuf>,
        #[arg(long)]
        records: Option<PathBuf>,
    },

    /// Validate names, then check coverage
    Names {
        #[arg(long)]
        records: Option<PathBuf>,
        #[arg(long)]
        topology: Option<PathBuf>,
        #[arg(long)]
        registry: Option<PathBuf>,
    },

    /// Print the merged metrics of one country
    Show {
        #[arg(long)]
        country: String,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        merged: Option<PathBuf>,
        #[arg(long)]
        registry: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = PrepConfig::new(&cli.data_dir);
    tracing::debug!(data_dir = %config.data_dir.display(), "configuration loaded");

    match cli.command {
        Command::Merge { gdp, gdppc, inflation, output, csv } => {
            let gdp = config.path_or(gdp.as_deref(), GDP_FILE);
            let gdppc = config.path_or(gdppc.as_deref(), GDPPC_FILE);
            let inflation = config.path_or(inflation.as_deref(), INFLATION_FILE);
            let output = config.path_or(output.as_deref(), MERGED_FILE);
            let csv = csv.as_deref().map(|p| config.resolve(p));
            let paths = MergePaths {
                gdp: &gdp,
                gdppc: &gdppc,
                inflation: &inflation,
                output: &output,
            };
            run_merge(paths, csv.as_deref())
        }
        Command::Validate { records, registry } => {
            let registry = open_registry(&config, registry.as_deref())?;
            run_validate(&registry, &config.path_or(records.as_deref(), GDP_FILE))
        }
        Command::Coverage { topology, records } => run_coverage(
            &config.path_or(topology.as_deref(), TOPOLOGY_FILE),
            &config.path_or(records.as_deref(), GDP_FILE),
        ),
        Command::Names { records, topology, registry } => {
            let registry = open_registry(&config, registry.as_deref())?;
            let records = config.path_or(records.as_deref(), GDP_FILE);
            run_validate(&registry, &records)?;
            println!();
            run_coverage(&config.path_or(topology.as_deref(), TOPOLOGY_FILE), &records)
        }
        Command::Show { country, year, merged, registry } => {
            let registry = open_registry(&config, registry.as_deref())?;
            run_show(
                &registry,
                &config.path_or(merged.as_deref(), MERGED_FILE),
                &country,
                year.as_deref(),
            )
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_registry(config: &PrepConfig, path: Option<&Path>) -> Result<CountryRegistry> {
    match path {
        Some(path) => {
            let path = config.resolve(path);
            CountryRegistry::load(&path)
                .with_context(|| format!("Failed to load country registry: {}", path.display()))
        }
        None => CountryRegistry::iso3166().context("Bundled ISO 3166-1 table is unreadable"),
    }
}

fn run_merge(paths: MergePaths<'_>, csv: Option<&Path>) -> Result<()> {
    println!("🔀 Merging economic datasets");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Load + merge + write (any failure aborts before writing)
    println!("\n📂 Loading sources...");
    println!("   {}", paths.gdp.display());
    println!("   {}", paths.gdppc.display());
    println!("   {}", paths.inflation.display());

    let (merged, stats) = merge_files(&paths).context("Merge aborted, no output written")?;
    println!(
        "\n✓ {} records → {} countries, {} country/year entries",
        stats.records,
        merged.country_count(),
        merged.entry_count()
    );
    if stats.overwrites > 0 {
        println!("⚠️  {} values were overwritten by a later record", stats.overwrites);
    }
    println!("✓ {}", paths.output.display());

    if let Some(csv) = csv {
        merged
            .write_csv(csv)
            .with_context(|| format!("Failed to write CSV export: {}", csv.display()))?;
        println!("✓ {}", csv.display());
    }

    Ok(())
}

fn run_validate(registry: &CountryRegistry, records: &Path) -> Result<()> {
    let doc = load_json(records).context("Failed to load records")?;
    let report = validate_document(registry, &doc);
    tracing::info!("{}", report.summary());

    println!("Non Valid Country Names: {:?}", report.invalid_sorted());
    println!();
    println!("Unique Countries: {:?}", report.valid_sorted());

    Ok(())
}

fn run_coverage(topology: &Path, records: &Path) -> Result<()> {
    let topology_doc = load_json(topology).context("Failed to load map topology")?;
    let records_doc = load_json(records).context("Failed to load records")?;

    let report = check_coverage(&topology_doc, &records_doc);
    tracing::info!("{}", report.summary());

    let name = records
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| records.display().to_string());
    println!("missing country names in {}: {:?}", name, report.missing_sorted());

    Ok(())
}

fn run_show(registry: &CountryRegistry, merged_path: &Path, country: &str, year: Option<&str>) -> Result<()> {
    let merged = MergedData::load(merged_path).context("Failed to load merged data")?;

    let Some(key) = merged.resolve_country(registry, country) else {
        bail!("Country not found in merged data: {}", country);
    };
    let Some(years) = merged.years(key) else {
        bail!("Country not found in merged data: {}", country);
    };

    println!("🌍 {}", key);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let selected: Vec<(&String, _)> = match year {
        Some(year) => match years.get_key_value(year) {
            Some(entry) => vec![entry],
            None => bail!("No data for {} in {}", key, year),
        },
        None => years.iter().collect(),
    };

    for (year, values) in selected {
        let line: Vec<String> = Metric::ALL
            .iter()
            .map(|metric| format!("{}: {}", metric.label(), format_metric(*metric, values.get(metric))))
            .collect();
        println!("{}  {}", year, line.join("  |  "));
    }

    Ok(())
}
