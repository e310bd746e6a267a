use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use salescope_analytics::{PipelineOptions, ReportOptions, run_pipeline};
use salescope_core::{FilterOptions, clock, format_currency, profile_dataset, validate_and_filter};
use salescope_ingest::{ParsedBatch, clean_sales_data, parse_sales_text, read_sales_file};
use std::path::{Path, PathBuf};
use tracing::debug;

mod config;
mod logging;
mod state;

use config::Config;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SALESCOPE_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "salescope", version = VERSION, about = "Sales extract analytics and enrichment")]
struct Cli {
    /// Config file (default: ~/.salescope/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean, validate, analyse, enrich, and write the report
    Run {
        /// Pipe-delimited sales extract
        #[arg(long)]
        input: Option<PathBuf>,

        /// Keep only this region (exact match)
        #[arg(long)]
        region: Option<String>,

        /// Minimum transaction amount (inclusive)
        #[arg(long)]
        min_amount: Option<f64>,

        /// Maximum transaction amount (inclusive)
        #[arg(long)]
        max_amount: Option<f64>,

        /// Read the product catalog from a JSON file instead of the API
        #[arg(long)]
        catalog_file: Option<PathBuf>,

        /// Skip the catalog API; every transaction is left unenriched
        #[arg(long)]
        offline: bool,

        /// Where to write the enriched extract
        #[arg(long)]
        enriched_out: Option<PathBuf>,

        /// Where to write the text report
        #[arg(long)]
        report_out: Option<PathBuf>,
    },

    /// Parse and validate only; print record counts
    Clean {
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Show the regions and amount range present in an extract
    Regions {
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Fetch the product catalog and list it
    Catalog {
        /// Number of products to request
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Config file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let cfg = config::load_config(cli.config.as_deref())?;
    debug!(config = ?cli.config, catalog = %cfg.catalog.url, "loaded config");

    match cli.command {
        Command::Run {
            input,
            region,
            min_amount,
            max_amount,
            catalog_file,
            offline,
            enriched_out,
            report_out,
        } => {
            let input = input.unwrap_or_else(|| cfg.input.path.clone());
            let filters = FilterOptions {
                region,
                min_amount,
                max_amount,
            };
            let options = PipelineOptions {
                enriched_path: enriched_out.unwrap_or_else(|| cfg.output.enriched_path.clone()),
                report_path: report_out.unwrap_or_else(|| cfg.output.report_path.clone()),
                report: report_options(&cfg)?,
            };
            run(&cfg, &input, &filters, catalog_file, offline, &options).await?;
        }

        Command::Clean { input } => {
            let input = input.unwrap_or_else(|| cfg.input.path.clone());
            let text = read_input(&input)?;
            let report = clean_sales_data(&text)?;
            println!("Total records parsed: {}", report.total_records);
            println!(
                "Invalid records removed: {} ({} unparseable, {} failed validation)",
                report.invalid_records, report.parse_rejects, report.structural_rejects
            );
            println!("Valid records after cleaning: {}", report.valid.len());
        }

        Command::Regions { input } => {
            let input = input.unwrap_or_else(|| cfg.input.path.clone());
            let batch = parse_input(&input)?;
            let profile = profile_dataset(&batch.transactions);
            let regions: Vec<_> = profile.regions.iter().map(String::as_str).collect();
            println!("Available Regions: {}", regions.join(", "));
            match profile.amount_range {
                Some((lo, hi)) => println!(
                    "Transaction Amount Range: {} - {}",
                    format_currency(&cfg.report.currency_symbol, lo),
                    format_currency(&cfg.report.currency_symbol, hi)
                ),
                None => println!("Transaction Amount Range: N/A"),
            }
        }

        Command::Catalog { limit } => {
            let mut http = cfg.catalog.http();
            if let Some(limit) = limit {
                http = http.with_limit(limit);
            }
            let entries = http.fetch().await.context("fetching product catalog")?;
            println!("Fetched {} products from {}\n", entries.len(), http.url);
            for e in &entries {
                println!(
                    "{:>5}  {:<40} {:<20} {:<20} {}",
                    e.id,
                    e.title.as_deref().unwrap_or("-"),
                    e.category.as_deref().unwrap_or("-"),
                    e.brand.as_deref().unwrap_or("-"),
                    e.rating.map(|r| format!("{r:.2}")).unwrap_or_else(|| "-".to_string())
                );
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(cli.config.as_deref())?,
            ConfigCommand::Show => {
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("Input not found: {} (pass --input <path>)", path.display());
    }
    Ok(read_sales_file(path)?.text)
}

fn parse_input(path: &Path) -> Result<ParsedBatch> {
    let text = read_input(path)?;
    parse_sales_text(&text).with_context(|| format!("parsing {}", path.display()))
}

fn report_options(cfg: &Config) -> Result<ReportOptions> {
    let generated_at = clock::now_in(&cfg.report.timezone)?;
    Ok(ReportOptions {
        generated_at,
        currency_symbol: cfg.report.currency_symbol.clone(),
        top_n: cfg.report.top_n,
        low_performer_threshold: cfg.report.low_performer_threshold,
    })
}

async fn run(
    cfg: &Config,
    input: &Path,
    filters: &FilterOptions,
    catalog_file: Option<PathBuf>,
    offline: bool,
    options: &PipelineOptions,
) -> Result<()> {
    let batch = parse_input(input)?;
    println!(
        "Parsed {} records from {} ({} unparseable)",
        batch.total_lines,
        input.display(),
        batch.rejects.len()
    );

    debug!(?filters, "applying filters");
    let outcome = validate_and_filter(&batch.transactions, filters);
    let s = &outcome.summary;
    println!("Invalid records: {}", s.invalid + batch.rejects.len());
    if filters.region.is_some() {
        println!("Filtered by region: {}", s.filtered_by_region);
    }
    if filters.min_amount.is_some() || filters.max_amount.is_some() {
        println!("Filtered by amount: {}", s.filtered_by_amount);
    }
    println!("Final valid records: {}\n", s.final_count);

    let catalog = cfg.catalog.source(catalog_file, offline);
    let out = run_pipeline(outcome.accepted, &catalog, options).await?;

    println!(
        "Total revenue: {}",
        format_currency(&options.report.currency_symbol, out.analytics.total_revenue)
    );
    println!(
        "Enriched {}/{} transactions ({:.1}%)",
        out.enrichment.enriched, out.enrichment.total, out.enrichment.success_rate
    );
    println!("Enriched data: {}", options.enriched_path.display());
    println!("Report: {}", options.report_path.display());

    Ok(())
}
