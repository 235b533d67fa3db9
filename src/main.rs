//! shotconvert CLI - transform Garmin shot exports to ShotPattern format.
//!
//! ```bash
//! shotconvert setup                 # scaffold config.json from a sample export
//! shotconvert run                   # convert every export in data/garmin
//! shotconvert clubs session.csv     # show club names and mapping coverage
//! shotconvert parse session.csv     # debug: dump parsed records as JSON
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use shotconvert::config::{self, Config};
use shotconvert::error::CsvResult;
use shotconvert::models::UnitSystem;
use shotconvert::parser::{self, ReadOptions};
use shotconvert::{report, transform};

#[derive(Parser)]
#[command(name = "shotconvert")]
#[command(about = "Transform Garmin shot data to ShotPattern format", long_about = None)]
struct Cli {
    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold or update config.json from a sample Garmin export
    Setup {
        /// Sample export to detect columns and clubs from
        /// (default: first CSV in the input directory)
        #[arg(short, long)]
        sample: Option<PathBuf>,

        /// Unit system of the exports
        #[arg(short, long, default_value = "meters")]
        unit: String,

        /// Overwrite an existing config.json
        #[arg(short, long)]
        force: bool,

        /// Configuration file location
        #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Convert every CSV in the input directory
    Run {
        /// Input directory (default: data/garmin, or $SHOTCONVERT_INPUT_DIR)
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Output directory (default: data/output, or $SHOTCONVERT_OUTPUT_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Configuration file location
        #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Show club names found in an export and their mapping status
    Clubs {
        /// Garmin export to inspect
        input: PathBuf,

        /// Configuration file location
        #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Parse an export and print its records as JSON (debugging)
    Parse {
        /// Garmin export to parse
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Keep the units row under the header as a data row
        #[arg(long)]
        keep_units_row: bool,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    report::set_quiet(cli.quiet);

    let result = match cli.command {
        Commands::Setup {
            sample,
            unit,
            force,
            config,
        } => cmd_setup(sample.as_deref(), &unit, force, &config),

        Commands::Run {
            input_dir,
            output_dir,
            config,
        } => cmd_run(input_dir, output_dir, &config),

        Commands::Clubs { input, config } => cmd_clubs(&input, &config),

        Commands::Parse {
            input,
            delimiter,
            keep_units_row,
        } => cmd_parse(&input, delimiter, keep_units_row),
    };

    if let Err(e) = result {
        report::error(e.to_string());
        std::process::exit(1);
    }
}

fn resolve_dir(cli_value: Option<PathBuf>, env_var: &str, default: &str) -> PathBuf {
    cli_value
        .or_else(|| std::env::var_os(env_var).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

fn cmd_run(
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    config_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(config_path)?;
    let input_dir = resolve_dir(input_dir, "SHOTCONVERT_INPUT_DIR", config::DEFAULT_INPUT_DIR);
    let output_dir = resolve_dir(
        output_dir,
        "SHOTCONVERT_OUTPUT_DIR",
        config::DEFAULT_OUTPUT_DIR,
    );

    report::info(format!(
        "{} -> {} ({})",
        input_dir.display(),
        output_dir.display(),
        config.unit_system
    ));

    let reports = transform::run_dir(&input_dir, &config, &output_dir)?;
    for file_report in &reports {
        transform::print_report(file_report);
    }

    let processed = reports.iter().filter(|r| r.succeeded()).count();
    let failed = reports.len() - processed;
    let written: usize = reports.iter().map(|r| r.rows_written).sum();
    let skipped: usize = reports.iter().map(|r| r.skipped.len()).sum();
    report::info(format!(
        "{} file(s) processed, {} failed, {} rows written, {} rows skipped",
        processed, failed, written, skipped
    ));
    report::info(format!(
        "import with '{}' units selected in ShotPattern",
        config.unit_system
    ));

    if failed == reports.len() {
        // nothing converted at all
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_setup(
    sample: Option<&Path>,
    unit: &str,
    force: bool,
    config_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if config_path.exists() && !force {
        return Err(format!(
            "'{}' already exists - pass --force to overwrite",
            config_path.display()
        )
        .into());
    }

    let unit_system = UnitSystem::from_label(unit)
        .ok_or_else(|| format!("unknown unit system '{unit}' (use meters or yards)"))?;

    let sample = match sample {
        Some(path) => path.to_path_buf(),
        None => {
            let input_dir =
                resolve_dir(None, "SHOTCONVERT_INPUT_DIR", config::DEFAULT_INPUT_DIR);
            transform::discover_inputs(&input_dir)?
                .into_iter()
                .next()
                .ok_or("no sample file found")?
        }
    };

    report::info(format!("analyzing sample {}", sample.display()));
    let headers = parser::read_headers(&sample)?;
    report::success(format!("found {} columns: {}", headers.len(), headers.join(", ")));

    let club_names = distinct_clubs(&sample, headers.first().map(String::as_str).unwrap_or(""))?;
    report::success(format!("found {} distinct club names", club_names.len()));

    let config = config::scaffold(&headers, &club_names, unit_system);
    config.save(config_path)?;
    report::success(format!("wrote {}", config_path.display()));

    let unmapped: Vec<&String> = club_names
        .iter()
        .filter(|name| config.resolve_club(name).is_none())
        .collect();
    if !unmapped.is_empty() {
        report::warning(format!(
            "{} club name(s) need aliases in club_aliases: {}",
            unmapped.len(),
            unmapped
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    report::info("review column_mapping and club_aliases, then run `shotconvert run`");
    Ok(())
}

fn cmd_clubs(input: &Path, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(config_path)?;
    let club_names = club_counts(input, &config)?;

    println!("{:<28} {:>6}  {}", "Club name", "Shots", "Status");
    let mut mapped = 0;
    for (name, count) in &club_names {
        let status = match config.resolve_club(name) {
            Some(canonical) => {
                mapped += 1;
                format!("mapped -> {canonical}")
            }
            None => "unmapped".to_string(),
        };
        println!("{name:<28} {count:>6}  {status}");
    }
    report::info(format!(
        "{} of {} club name(s) mapped",
        mapped,
        club_names.len()
    ));
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    keep_units_row: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = parser::open(
        input,
        &ReadOptions {
            delimiter,
            skip_units_row: !keep_units_row,
        },
    )?;
    report::info(format!(
        "encoding {}, delimiter '{}'",
        file.encoding,
        match file.delimiter {
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        }
    ));

    let records = file.records().collect::<CsvResult<Vec<_>>>()?;
    report::success(format!("parsed {} records", records.len()));
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Distinct values of the club column of a sample file, sorted.
fn distinct_clubs(path: &Path, club_column: &str) -> CsvResult<Vec<String>> {
    let file = parser::open(path, &ReadOptions::default())?;
    let mut names = std::collections::BTreeSet::new();
    for record in file.records() {
        if let Some(name) = record?.get(club_column) {
            if !name.is_empty() {
                names.insert(name.clone());
            }
        }
    }
    Ok(names.into_iter().collect())
}

/// Shot counts per distinct club name in an export.
fn club_counts(path: &Path, config: &Config) -> CsvResult<Vec<(String, usize)>> {
    let file = parser::open(
        path,
        &ReadOptions {
            delimiter: None,
            skip_units_row: config.skip_units_row,
        },
    )?;
    let mut counts = std::collections::BTreeMap::new();
    for record in file.records() {
        if let Some(name) = record?.get(&config.column_mapping.club) {
            if !name.is_empty() {
                *counts.entry(name.clone()).or_insert(0usize) += 1;
            }
        }
    }
    Ok(counts.into_iter().collect())
}
