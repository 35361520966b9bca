//! Biotools - interaction data command line

use anyhow::{Context, Result};
use biotools::config::Config;
use biotools::gene2uniprot::{ConcurrentResolver, MyGeneClient, ResolverConfig};
use biotools::mitab::{ExtractionKind, FieldExtractor, HeaderMode, RecordTable, TaxidMode};
use biotools::protein_annotation::{AnnotationFetcher, EbiProteinClient};
use biotools_common::logging::{init_logging, LogConfig, LogLevel};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "biotools")]
#[command(author, version, about = "Molecular interaction data tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Extract fields from a PSI-MITAB file
    Mitab {
        /// Tab-separated MITAB file
        #[arg(short, long)]
        input: PathBuf,

        /// Fields to extract (protein_id, taxid, publications)
        #[arg(short, long, value_delimiter = ',', default_value = "protein_id")]
        extract: Vec<ExtractionKind>,

        /// How taxonomy cells are rendered
        #[arg(long, default_value = "digits")]
        taxid_mode: TaxidMode,

        /// Input has no header line; use the standard MITAB 2.7 columns
        #[arg(long)]
        no_header: bool,
    },

    /// Resolve gene symbols to UniProt accessions
    Gene2uniprot {
        /// Gene symbols
        genes: Vec<String>,

        /// File with one gene symbol per line
        #[arg(long)]
        genes_file: Option<PathBuf>,

        /// NCBI taxonomy id of the species
        #[arg(long)]
        taxid: Option<u32>,

        /// Maximum number of resolution passes
        #[arg(long)]
        cycles: Option<u32>,
    },

    /// Fetch annotations for UniProt accessions
    Annotate {
        /// UniProt accessions
        ids: Vec<String>,

        /// File with one accession per line
        #[arg(long)]
        ids_file: Option<PathBuf>,

        /// Maximum number of proteins fetched at once
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("biotools")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    let config = Config::load()?;

    match cli.command {
        Command::Mitab {
            input,
            extract,
            taxid_mode,
            no_header,
        } => {
            let header = if no_header {
                HeaderMode::Standard
            } else {
                HeaderMode::FromFile
            };
            let table = RecordTable::from_path(&input, header)
                .with_context(|| format!("Failed to load {}", input.display()))?;
            info!(rows = table.len(), path = %input.display(), "Loaded MITAB table");

            let extractor = FieldExtractor::new(&table, &extract)?;
            print_json(&extractor.extract_all(taxid_mode)?)?;
        },
        Command::Gene2uniprot {
            genes,
            genes_file,
            taxid,
            cycles,
        } => {
            let symbols = collect_inputs(genes, genes_file.as_deref())?;

            let mut resolver_config = ResolverConfig::from(&config.resolver);
            if let Some(taxid) = taxid {
                resolver_config = resolver_config.with_taxid(taxid);
            }
            if let Some(cycles) = cycles {
                resolver_config = resolver_config.with_cycles(cycles);
            }

            info!(genes = symbols.len(), "Resolving gene symbols");
            let resolver = ConcurrentResolver::new(
                MyGeneClient::from_config(&config.endpoints)?,
                resolver_config,
            )?;
            print_json(&resolver.resolve(&symbols).await)?;
        },
        Command::Annotate {
            ids,
            ids_file,
            max_concurrent,
            progress,
        } => {
            let ids = collect_inputs(ids, ids_file.as_deref())?;
            let max_concurrent = max_concurrent.unwrap_or(config.fetcher.max_concurrent);

            info!(proteins = ids.len(), max_concurrent, "Fetching protein annotations");
            let fetcher = AnnotationFetcher::new(
                EbiProteinClient::from_config(&config.endpoints)?,
                max_concurrent,
            )?
            .with_progress(progress);
            print_json(&fetcher.fetch(&ids).await)?;
        },
    }

    Ok(())
}

/// Positional values followed by the non-blank lines of `file`
fn collect_inputs(mut values: Vec<String>, file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        values.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }
    if values.is_empty() {
        anyhow::bail!("No input values given");
    }
    Ok(values)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
