//! sheetllm CLI - compress spreadsheets into token-budgeted text

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sheetllm::chunking::detect_header_rows;
use sheetllm::output::{compressed_path, method_label};
use sheetllm::prelude::*;
use sheetllm::strategy::is_large_sheet;
use sheetllm::{compress_to_file, compress_workbook, open_csv, write_outcome, CsvReadOptions, PieceEstimator};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetllm")]
#[command(
    author,
    version,
    about = "Compress spreadsheets into compact, token-budgeted text for language models"
)]
struct Cli {
    /// Log pipeline decisions (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a sheet with one module configuration
    Compress {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        settings: Settings,

        /// Disable structural-anchor extraction
        #[arg(long)]
        no_anchors: bool,

        /// Disable the inverted-index value encoding
        #[arg(long)]
        no_inverted_index: bool,

        /// Disable format aggregation
        #[arg(long)]
        no_format_aggregation: bool,

        /// Rows/columns kept around each anchor
        #[arg(long)]
        anchor_proximity: Option<u32>,
    },

    /// Try every strategy on each sheet and keep the most compact
    Best {
        /// Input CSV files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        settings: Settings,

        /// Do not record sheet metadata in the output directory
        #[arg(long)]
        no_store: bool,
    },

    /// Show information about a sheet
    Info {
        /// Input CSV file
        input: PathBuf,

        /// Read the first row as data, not as a header
        #[arg(long)]
        no_header: bool,
    },

    /// List stored sheets relevant to a question
    Query {
        /// Directory holding compressed output and metadata_index.json
        output_dir: PathBuf,

        /// Free-text question
        query: String,
    },
}

/// Options shared by the compressing commands
#[derive(Args)]
struct Settings {
    /// Directory to write compressed output to
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// JSON configuration file; flags override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Token budget
    #[arg(short = 't', long)]
    max_tokens: Option<usize>,

    /// Token estimator
    #[arg(long, value_enum, default_value_t = EstimatorKind::Chars)]
    estimator: EstimatorKind,

    /// Read the first row as data, not as a header
    #[arg(long)]
    no_header: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum EstimatorKind {
    /// One token per four characters
    Chars,
    /// Word and punctuation pieces
    Pieces,
}

impl EstimatorKind {
    fn estimator(self) -> Box<dyn TokenEstimator> {
        match self {
            EstimatorKind::Chars => Box::new(CharRatioEstimator::default()),
            EstimatorKind::Pieces => Box::new(PieceEstimator),
        }
    }
}

impl Settings {
    fn load_config(&self) -> Result<CompressionConfig> {
        let mut config = match &self.config {
            Some(path) => CompressionConfig::load(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => CompressionConfig::default(),
        };
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compress {
            input,
            settings,
            no_anchors,
            no_inverted_index,
            no_format_aggregation,
            anchor_proximity,
        } => {
            let mut config = settings.load_config()?;
            if no_anchors {
                config.use_structural_anchors = false;
            }
            if no_inverted_index {
                config.use_inverted_index = false;
            }
            if no_format_aggregation {
                config.use_format_aggregation = false;
            }
            if let Some(k) = anchor_proximity {
                config.anchor_proximity = k;
            }
            compress(&input, &settings, &config)
        }
        Commands::Best {
            inputs,
            settings,
            no_store,
        } => best(&inputs, &settings, no_store),
        Commands::Info { input, no_header } => show_info(&input, no_header),
        Commands::Query { output_dir, query } => run_query(&output_dir, &query),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_sheet(input: &Path, no_header: bool) -> Result<SheetMatrix> {
    let options = CsvReadOptions {
        has_header: !no_header,
        ..CsvReadOptions::default()
    };
    open_csv(input, &options).with_context(|| format!("Failed to open '{}'", input.display()))
}

/// File prefix of a sheet's output
fn sheet_prefix(grid: &SheetMatrix) -> String {
    grid.name().replace(' ', "_")
}

fn compress(input: &Path, settings: &Settings, config: &CompressionConfig) -> Result<()> {
    let grid = read_sheet(input, settings.no_header)?;
    let estimator = settings.estimator.estimator();

    info!(method = %method_label(config), max_tokens = config.max_tokens, "compressing");
    let stats = compress_to_file(
        &grid,
        &settings.output_dir,
        &sheet_prefix(&grid),
        config,
        estimator.as_ref(),
    )
    .with_context(|| format!("Failed to compress '{}'", input.display()))?;

    println!("Original dimensions: {}x{}", stats.original_rows, stats.original_cols);
    println!("Original cell count: {}", stats.original_cell_count);
    println!("Compressed cell count: {}", stats.compressed_cell_count);
    println!("Cell ratio: {:.2}", stats.cell_ratio);
    println!("Token count: {}", stats.token_count);
    if let Some(chunks) = stats.chunks {
        println!("Chunks: {}", chunks);
    }
    println!("Output saved to: {}", stats.output_file.display());

    let stats_path = settings
        .output_dir
        .join(format!("{}_all_sheets_stats.json", sheet_prefix(&grid)));
    let json = serde_json::to_string_pretty(&[&stats]).context("Failed to serialize statistics")?;
    std::fs::write(&stats_path, json)
        .with_context(|| format!("Failed to write '{}'", stats_path.display()))?;

    Ok(())
}

fn best(inputs: &[PathBuf], settings: &Settings, no_store: bool) -> Result<()> {
    let config = settings.load_config()?;
    let estimator = settings.estimator.estimator();

    let sheets = inputs
        .iter()
        .map(|input| read_sheet(input, settings.no_header))
        .collect::<Result<Vec<_>>>()?;

    let store = if no_store {
        None
    } else {
        Some(
            MetadataStore::open(&settings.output_dir).with_context(|| {
                format!("Failed to open metadata store in '{}'", settings.output_dir.display())
            })?,
        )
    };

    let mut failed = 0usize;
    for (name, result) in compress_workbook(&sheets, &config, estimator.as_ref()) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("Error processing sheet {}: {}", name, e);
                failed += 1;
                continue;
            }
        };

        let prefix = name.replace(' ', "_");
        let path = write_outcome(&settings.output_dir, &prefix, &outcome)
            .with_context(|| format!("Failed to write output for '{}'", name))?;
        if let Some(store) = &store {
            store
                .update(&prefix, outcome.metadata.clone())
                .with_context(|| format!("Failed to save metadata for '{}'", name))?;
        }

        let ratio = outcome
            .ratio
            .map_or_else(|| "n/a (large sheet)".to_string(), |r| format!("{:.3}", r));
        println!(
            "{}\t{}\tratio {}\t{} tokens\t{}",
            name,
            outcome.method,
            ratio,
            outcome.encoded.tokens,
            path.display()
        );
    }

    if failed > 0 {
        anyhow::bail!("{} of {} sheets failed", failed, sheets.len());
    }
    Ok(())
}

fn show_info(input: &Path, no_header: bool) -> Result<()> {
    let grid = read_sheet(input, no_header)?;
    let config = CompressionConfig::default();

    println!("File: {}", input.display());
    println!("Sheet: \"{}\"", grid.name());
    println!("  Dimensions: {} rows x {} columns", grid.max_row(), grid.max_col());
    println!("  Populated cells: {}", grid.populated_count());
    println!("  Merged ranges: {}", grid.merged_ranges().len());

    let headers: Vec<String> = detect_header_rows(&grid, &config.chunking)
        .iter()
        .map(u32::to_string)
        .collect();
    println!("  Header rows: {}", headers.join(", "));
    if is_large_sheet(&grid, &config) {
        println!("  Large sheet: strategy search is skipped");
    }

    let mut types: BTreeMap<DataType, usize> = BTreeMap::new();
    for cell in grid.populated() {
        *types.entry(cell.data_type).or_default() += 1;
    }
    println!("  Data types:");
    for (data_type, count) in types {
        println!("    {}: {}", data_type, count);
    }

    Ok(())
}

fn run_query(output_dir: &Path, query: &str) -> Result<()> {
    let store = MetadataStore::open(output_dir)
        .with_context(|| format!("Failed to open metadata store in '{}'", output_dir.display()))?;

    let hits = store.relevant_sheets(query);
    if hits.is_empty() {
        println!("No relevant data found for your query.");
        return Ok(());
    }

    for (sheet, score) in hits {
        let path = compressed_path(output_dir, &sheet);
        if path.exists() {
            println!("{}\t{}\t{}", score, sheet, path.display());
        } else {
            warn!(sheet = %sheet, "compressed file missing");
            println!("{}\t{}\t(missing)", score, sheet);
        }
    }

    Ok(())
}
