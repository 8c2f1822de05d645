//! Paper-Trawl main entry point
//!
//! This is the command-line interface for the Paper-Trawl document harvester.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::Parser;
use paper_trawl::config::{load_config_with_hash, Config};
use paper_trawl::document::{DocumentFormat, PdfFormat};
use paper_trawl::output::{count_directory, print_report};
use paper_trawl::runner::{plan_site, run_single, run_sites};
use paper_trawl::url::normalize_url;
use paper_trawl::Pipeline;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Paper-Trawl: harvest and merge the documents linked from daily page sets
///
/// Paper-Trawl walks the pages reachable from a seed URL, downloads every
/// linked document, validates it, and merges the valid ones into a single
/// PDF in the order they were discovered.
#[derive(Parser, Debug)]
#[command(name = "paper-trawl")]
#[command(version)]
#[command(about = "Harvest and merge linked documents", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run once for this seed URL instead of the configured sites
    #[arg(long, value_name = "URL", conflicts_with_all = ["count", "from", "to"])]
    seed: Option<String>,

    /// First date to process for configured sites (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "to")]
    from: Option<NaiveDate>,

    /// Last date to process for configured sites, inclusive (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "from")]
    to: Option<NaiveDate>,

    /// Directory for staged and merged files (overrides the config)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Print page counts for the PDFs in DIR and exit
    #[arg(long, value_name = "DIR", conflicts_with = "dry_run")]
    count: Option<PathBuf>,

    /// Validate config and show the seeds that would run without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(directory) = &cli.count {
        handle_count(directory);
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    if cli.dry_run {
        handle_dry_run(&config, &cli, &output_dir)?;
    } else if let Some(seed) = &cli.seed {
        handle_seed(&config, seed, &output_dir).await?;
    } else {
        let (from, to) = date_bounds(&cli)?;
        handle_sites(&config, from, to, &output_dir).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("paper_trawl=info,warn"),
            1 => EnvFilter::new("paper_trawl=debug,info"),
            2 => EnvFilter::new("paper_trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn date_bounds(cli: &Cli) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    match (cli.from, cli.to) {
        (Some(from), Some(to)) if from <= to => Ok((from, to)),
        (Some(from), Some(to)) => bail!("--from {} is after --to {}", from, to),
        _ => bail!("either --seed or both --from and --to are required"),
    }
}

/// Handles --count: prints page counts for a directory
fn handle_count(directory: &Path) {
    if !directory.is_dir() {
        println!("Directory {} does not exist", directory.display());
        return;
    }

    match count_directory(directory, &PdfFormat) {
        Ok(report) => print_report(directory, &report),
        Err(e) => println!("Could not scan {}: {}", directory.display(), e),
    }
}

/// Handles --dry-run: validates config and shows what would run
fn handle_dry_run(config: &Config, cli: &Cli, output_dir: &Path) -> anyhow::Result<()> {
    println!("=== Paper-Trawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Page timeout: {}s", config.crawler.page_timeout_secs);
    println!("  Document timeout: {}s", config.crawler.document_timeout_secs);
    println!("  Workers: {}", config.crawler.workers);
    println!(
        "  Attempts: {} ({}ms apart)",
        config.crawler.max_attempts, config.crawler.retry_delay_ms
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nLinks:");
    println!(
        "  Content pages: '{}' + '{}'",
        config.links.page_token, config.links.page_extension
    );
    println!("  Documents: '{}'", config.links.document_extension);

    println!("\nOutput:");
    println!("  Directory: {}", output_dir.display());
    println!("  Page limit per site: {}", config.output.page_limit);

    if let Some(seed) = &cli.seed {
        let seed = normalize_url(seed)?;
        println!("\n✓ Would process seed {}", seed);
        return Ok(());
    }

    let (from, to) = date_bounds(cli)?;
    let extension = PdfFormat.extension();
    println!("\nSites ({}), {} to {}:", config.sites.len(), from, to);
    for site in &config.sites {
        match plan_site(site, from, to, extension) {
            Ok(plans) => {
                println!("  - {} ({} seeds)", site.name, plans.len());
                for plan in &plans {
                    println!("    * {} -> {}", plan.seed, plan.merged_filename);
                }
            }
            Err(e) => println!("  - {} (skipped: {})", site.name, e),
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles --seed: one pipeline run
async fn handle_seed(config: &Config, seed: &str, output_dir: &Path) -> anyhow::Result<()> {
    let seed = normalize_url(seed)?;
    let pipeline = Pipeline::new(config)?;

    let units = run_single(&pipeline, &seed, output_dir).await?;
    if units > 0 {
        tracing::info!("Merged {} pages from {}", units, seed);
    } else {
        tracing::warn!("Nothing merged from {}", seed);
    }

    Ok(())
}

/// Handles the configured sites over a date range
async fn handle_sites(
    config: &Config,
    from: NaiveDate,
    to: NaiveDate,
    output_dir: &Path,
) -> anyhow::Result<()> {
    if config.sites.is_empty() {
        bail!("no [[site]] entries configured");
    }

    tracing::info!(
        "Processing {} sites from {} to {}",
        config.sites.len(),
        from,
        to
    );

    let pipeline = Pipeline::new(config)?;
    let summaries = run_sites(&pipeline, config, from, to, output_dir).await?;

    for summary in &summaries {
        match &summary.skipped {
            Some(reason) => tracing::warn!("{}: skipped ({})", summary.name, reason),
            None => tracing::info!(
                "{}: {} pages in {} files over {} runs{}",
                summary.name,
                summary.total_units,
                summary.outputs.len(),
                summary.runs,
                if summary.limit_reached { " (limit reached)" } else { "" }
            ),
        }
    }

    Ok(())
}
