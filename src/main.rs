//! autocvlac - Impactu research products to CvLAC form payloads
//!
//! ## Usage
//!
//! ```bash
//! # Product table (CSV) for one or more researchers
//! autocvlac products 0000123456 --since 2020 -o products.csv
//!
//! # Form payloads of journal articles missing in CvLAC
//! autocvlac missing 0000123456 --registered cvlac_ids.txt
//!
//! # Run the submission pipeline without touching the portal
//! autocvlac dry-run 0000123456
//! ```

use anyhow::{Context, Result};
use autocvlac::{
    cvlac::{DryRunSubmitter, Session},
    extract::extract_scientific_article_data,
    filters::{self, MissingArticleFilter},
    flatten,
    impactu::{ClientConfig, ImpactuClient, QueryOptions, DEFAULT_MAX_RESULTS},
    pipeline,
    product::ResearchProduct,
    tabulate::ProductTable,
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Impactu research products to CvLAC form payloads
#[derive(Parser)]
#[command(name = "autocvlac")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Impactu API base URL (default: IMPACTU_API_URL or the public API)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Products per page
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RESULTS)]
    max: u32,

    /// Page number
    #[arg(long, global = true, default_value_t = 1)]
    page: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch products and write them as a CSV table
    Products {
        /// Researcher identifiers (cod_rh)
        #[arg(required = true)]
        cod_rh: Vec<String>,

        /// Keep only products from this year
        #[arg(long, conflicts_with = "since")]
        year: Option<i32>,

        /// Keep products from this year onwards, excluding Scienti records
        #[arg(long)]
        since: Option<i32>,

        /// Keep products whose venue name contains this text or whose ISSN equals it
        #[arg(long)]
        source: Option<String>,

        /// Output CSV file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print form payloads of journal articles missing in CvLAC
    Missing {
        #[command(flatten)]
        filter: MissingArgs,
    },

    /// Run the submission pipeline with a submitter that only logs
    DryRun {
        #[command(flatten)]
        filter: MissingArgs,
    },
}

#[derive(Args)]
struct MissingArgs {
    /// Researcher identifier (cod_rh)
    cod_rh: String,

    /// File with identifiers already registered in CvLAC, one per line
    #[arg(long)]
    registered: Option<PathBuf>,

    /// Require the venue to have an ISSN or EISSN
    #[arg(long)]
    require_issn: bool,

    /// Reference date for the five-year window (YYYY-MM-DD, default: today)
    #[arg(long)]
    today: Option<NaiveDate>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut config = ClientConfig::from_env().context("Invalid Impactu configuration")?;
    if let Some(api_url) = cli.api_url {
        config.base_url = api_url;
    }
    let options = QueryOptions {
        max_results: cli.max,
        page: cli.page,
    };
    let client = ImpactuClient::with_options(config, options.clone())?;

    match cli.command {
        Commands::Products {
            cod_rh,
            year,
            since,
            source,
            output,
        } => run_products(&client, &options, &cod_rh, year, since, source, output).await,
        Commands::Missing { filter } => run_missing(&client, &options, filter).await,
        Commands::DryRun { filter } => run_dry_run(&client, filter).await,
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn run_products(
    client: &ImpactuClient,
    options: &QueryOptions,
    ids: &[String],
    year: Option<i32>,
    since: Option<i32>,
    source: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut per_researcher = Vec::with_capacity(ids.len());
    for cod_rh in ids {
        let products = client
            .get_research_products(cod_rh, options)
            .await
            .with_context(|| format!("Failed to fetch products for {}", cod_rh))?;
        per_researcher.push(products);
    }
    let products: Vec<ResearchProduct> = flatten(per_researcher);

    let mut selected: Vec<&ResearchProduct> = match (year, since) {
        (Some(y), _) => filters::filter_by_year(&products, y),
        (None, Some(y)) => filters::filter_products_since_year(&products, y),
        (None, None) => products.iter().collect(),
    };
    if let Some(pattern) = source.as_deref() {
        selected = filters::filter_by_source(selected, pattern);
    }

    let table = ProductTable::from_products(selected);
    info!(rows = table.len(), columns = table.columns().len(), "Built product table");

    match output {
        Some(path) => table
            .save_csv(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => table
            .write_csv(std::io::stdout().lock())
            .context("Failed to write CSV to stdout")?,
    }
    Ok(())
}

async fn run_missing(client: &ImpactuClient, options: &QueryOptions, args: MissingArgs) -> Result<()> {
    let filter = build_filter(&args)?;
    let products = client
        .get_research_products(&args.cod_rh, options)
        .await
        .with_context(|| format!("Failed to fetch products for {}", args.cod_rh))?;

    let missing = filter.apply(&products);
    let payloads: Vec<_> = missing
        .into_iter()
        .filter_map(extract_scientific_article_data)
        .collect();
    info!(
        cod_rh = %args.cod_rh,
        fetched = products.len(),
        payloads = payloads.len(),
        "Extracted form payloads"
    );

    println!("{}", serde_json::to_string_pretty(&payloads)?);
    Ok(())
}

async fn run_dry_run(client: &ImpactuClient, args: MissingArgs) -> Result<()> {
    let filter = build_filter(&args)?;
    let session = Session::new(format!("dry-run:{}", args.cod_rh));

    let reports =
        pipeline::submit_missing_articles(client, &DryRunSubmitter, &session, &args.cod_rh, &filter)
            .await
            .with_context(|| format!("Failed to fetch products for {}", args.cod_rh))?;

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn build_filter(args: &MissingArgs) -> Result<MissingArticleFilter> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let registered = match &args.registered {
        Some(path) => read_registered_ids(path)?,
        None => Vec::new(),
    };
    Ok(MissingArticleFilter::new(today)
        .registered(registered.iter().map(String::as_str))
        .require_issn(args.require_issn))
}

/// One identifier per line; blank lines and `#` comments are ignored.
fn read_registered_ids(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read registered ids from {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_json_flag_is_global() {
        let cli = Cli::try_parse_from(["autocvlac", "missing", "0001", "--log-json"]).unwrap();
        assert!(cli.log_json);
        assert!(matches!(cli.command, Commands::Missing { .. }));

        let cli = Cli::try_parse_from(["autocvlac", "dry-run", "0001"]).unwrap();
        assert!(!cli.log_json);
    }
}
