//! dustfile - Filesystem inventory with duplicate detection.
//!
//! Usage:
//!   dustfile collect [ROOTS..]    Walk roots and write a dataset
//!   dustfile inspect PATH         Show the record for a single file
//!   dustfile columns              List dataset columns
//!   dustfile --help               Show help

use std::path::{Path, PathBuf};
use std::thread;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use dustfile_analyze::{HeuristicJunk, JunkClassifier};
use dustfile_core::InventoryConfig;
use dustfile_inventory::{
    COLUMNS, DatasetFormat, DatasetRow, FEATURE_COLUMNS, InventoryCollector, InventoryEntry,
    LABEL_COLUMN, default_dataset_name,
};
use dustfile_scan::{HashPolicy, RecordBuilder, ScanProgress};

#[derive(Parser)]
#[command(
    name = "dustfile",
    version,
    about = "Filesystem inventory with duplicate detection",
    long_about = "dustfile walks directory trees and writes one row per file: size, \
                  timestamps, extension, depth, content digest, duplicate flags and \
                  a junk label.\n\n\
                  Settings are read from <config dir>/dustfile/config.toml when it \
                  exists; command-line flags override them."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk roots and write the dataset
    Collect {
        /// Roots to scan (defaults to the configured roots, or the current directory)
        roots: Vec<PathBuf>,

        /// Skip directories whose path contains this text (case-insensitive, repeatable)
        #[arg(short, long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Files must be larger than this to be hashed (e.g., "10KB")
        #[arg(long, value_name = "SIZE")]
        min_hash_size: Option<String>,

        /// Files must be smaller than this to be hashed (e.g., "50MB")
        #[arg(long, value_name = "SIZE")]
        max_hash_size: Option<String>,

        /// Maximum number of digests per root
        #[arg(long, value_name = "N")]
        hash_limit: Option<u64>,

        /// Walk roots concurrently
        #[arg(short, long)]
        parallel: bool,

        /// Visit entries in filesystem order instead of sorted by name
        #[arg(long)]
        unsorted: bool,

        /// Dataset format
        #[arg(short, long, default_value = "csv")]
        format: DatasetArg,

        /// Output file (defaults to a timestamped name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the record for a single file
    Inspect {
        /// File to inspect
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Config file (TOML) providing the hash bounds
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List dataset columns
    Columns,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum DatasetArg {
    #[default]
    Csv,
    Json,
}

impl From<DatasetArg> for DatasetFormat {
    fn from(arg: DatasetArg) -> Self {
        match arg {
            DatasetArg::Csv => DatasetFormat::Csv,
            DatasetArg::Json => DatasetFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Collect {
            roots,
            exclude,
            min_hash_size,
            max_hash_size,
            hash_limit,
            parallel,
            unsorted,
            format,
            output,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            if !roots.is_empty() {
                config.roots = roots;
            }
            if config.roots.is_empty() {
                config.roots.push(PathBuf::from("."));
            }
            config.exclude_patterns.extend(exclude);
            if let Some(s) = min_hash_size {
                config.min_hash_size = parse_size(&s)?;
            }
            if let Some(s) = max_hash_size {
                config.max_hash_size = parse_size(&s)?;
            }
            if let Some(n) = hash_limit {
                config.hash_limit_per_root = n;
            }
            config.parallel_roots |= parallel;
            if unsorted {
                config.sort_entries = false;
            }

            run_collect(config, format.into(), output)?;
        }
        Command::Inspect {
            path,
            format,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            run_inspect(&path, &config, format)?;
        }
        Command::Columns => run_columns(),
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "dustfile={level},dustfile_scan={level},dustfile_analyze={level},dustfile_inventory={level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Explicit file must exist; the default location is optional.
fn load_config(explicit: Option<&Path>) -> Result<InventoryConfig> {
    if let Some(path) = explicit {
        return InventoryConfig::from_toml_file(path)
            .wrap_err_with(|| format!("Failed to load config from {}", path.display()));
    }

    match dirs::config_dir().map(|d| d.join("dustfile").join("config.toml")) {
        Some(path) if path.is_file() => {
            debug!(path = %path.display(), "Loading config");
            InventoryConfig::from_toml_file(&path)
                .wrap_err_with(|| format!("Failed to load config from {}", path.display()))
        }
        _ => Ok(InventoryConfig::new(Vec::<PathBuf>::new())),
    }
}

/// Walk every root and write the dataset.
fn run_collect(config: InventoryConfig, format: DatasetFormat, output: Option<PathBuf>) -> Result<()> {
    let collector = InventoryCollector::new(config).context("Invalid configuration")?;

    for root in &collector.config().roots {
        eprintln!("Scanning {}...", root.display());
    }

    let mut progress_rx = collector.subscribe();
    let progress_thread = thread::spawn(move || {
        loop {
            match progress_rx.blocking_recv() {
                Ok(progress) => print_progress(&progress),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let inventory = collector.collect();
    // Dropping the collector closes the progress channel.
    drop(collector);
    let _ = progress_thread.join();

    for failure in &inventory.failures {
        eprintln!("Skipped root {}: {}", failure.root.display(), failure.error);
    }

    let output = output.unwrap_or_else(|| PathBuf::from(default_dataset_name(format)));
    inventory
        .save(&output, format)
        .wrap_err_with(|| format!("Failed to write {}", output.display()))?;

    println!();
    println!("{}", "─".repeat(60));
    println!("{}", inventory.summary);
    println!("{}", "─".repeat(60));
    println!(" Wrote {} rows to {}", inventory.len(), output.display());

    if inventory.duplicates.has_duplicates() {
        println!();
        println!(" Largest duplicate groups:");
        for group in inventory.duplicates.groups.iter().take(5) {
            println!(
                "   {} copies of {}, {} wasted",
                group.count(),
                format_size(group.size),
                format_size(group.wasted_bytes)
            );
            if let Some(original) = group.original() {
                println!("     {}", original.display());
            }
        }
    }

    if inventory.summary.roots_scanned == 0 && !inventory.failures.is_empty() {
        bail!("No root could be scanned");
    }

    Ok(())
}

fn print_progress(progress: &ScanProgress) {
    eprintln!(
        "  {} files, {} hashed, {} ({:.0} files/s)",
        progress.files_scanned,
        progress.hashes_computed,
        format_size(progress.bytes_scanned),
        progress.files_per_second()
    );
}

/// Build and print the record for one file.
fn run_inspect(path: &Path, config: &InventoryConfig, format: OutputFormat) -> Result<()> {
    let builder = RecordBuilder::new(HashPolicy::from_config(config));
    let record = builder
        .inspect(path)
        .wrap_err_with(|| format!("Failed to inspect {}", path.display()))?;
    let is_junk = HeuristicJunk::default().is_junk(&record);
    let row = DatasetRow::from_entry(&InventoryEntry { record, is_junk });

    match format {
        OutputFormat::Text => {
            println!("{}", "─".repeat(60));
            println!(" {}", row.path);
            println!("{}", "─".repeat(60));
            println!(" size:           {} ({})", row.size, format_size(row.size));
            println!(" modified:       {}", row.last_modified_str);
            println!(" accessed:       {}", row.last_accessed_str);
            println!(" extension:      {}", row.extension);
            println!(" depth:          {}", row.depth);
            println!(
                " digest:         {}",
                row.digest.as_deref().unwrap_or("(not computed)")
            );
            println!(" junk:           {}", row.is_junk);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&row)?);
        }
    }

    Ok(())
}

fn run_columns() {
    for column in COLUMNS {
        let role = if column == LABEL_COLUMN {
            "label"
        } else if FEATURE_COLUMNS.contains(&column) {
            "feature"
        } else {
            ""
        };
        println!("{column:<20} {role}");
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a size string (e.g., "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let digits = s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.');
    let suffix = &s[digits.len()..];

    let multiplier: u64 = match suffix {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        _ => bail!("Unknown size suffix in {s:?}"),
    };
    let num: f64 = digits
        .parse()
        .wrap_err_with(|| format!("Invalid size {s:?}"))?;

    Ok((num * multiplier as f64) as u64)
}
