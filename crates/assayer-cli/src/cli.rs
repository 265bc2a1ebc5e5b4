//! CLI argument definitions for Assayer.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `search` | Score search candidates for a free-form query |
//! | `enrich asset` | Enrich one stored asset by id |
//! | `enrich query` | Resolve a query within a portfolio, inserting on miss |
//! | `enrich portfolio` | Enrich every asset in a portfolio |
//! | `enrich company` | Enrich every asset owned by a company |
//! | `enrich customer` | Enrich all portfolios linked to a customer |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use the offline instrument catalog |
//! | `--db` | `~/.assayer/assets.duckdb` | Database file override |
//!
//! # Examples
//!
//! ```bash
//! # Preview match scoring for a query
//! assayer search "apple" --limit 5
//!
//! # Enrich a single stored asset
//! assayer enrich asset 7c9e6679-7425-40de-944b-e07fc1f90ae7
//!
//! # Resolve a name inside a portfolio, inserting when unknown
//! assayer enrich query "Vanguard FTSE All-World" --portfolio p-1
//!
//! # Re-enrich a whole portfolio, four assets at a time
//! assayer enrich portfolio p-1 --include-enriched --concurrency 4
//! ```

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Assayer - asset identity resolution and enrichment CLI
///
/// Resolves sparse asset descriptions to canonical `CODE.EXCHANGE` tickers
/// and merges exchange listing and fundamentals data into stored records.
#[derive(Debug, Parser)]
#[command(
    name = "assayer",
    author,
    version,
    about = "Asset identity resolution and enrichment CLI",
    long_about = "Assayer resolves sparse asset descriptions against a market data search \
index and enriches stored records with exchange listing and fundamentals data.\n\
\n\
  • Tiered match scoring with a confidence floor\n\
  • Deterministic field-precedence merge that never touches user fields\n\
  • Single, portfolio, company and customer enrichment scopes\n\
  • Local DuckDB asset store\n\
\n\
Use 'assayer <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Use the deterministic offline catalog instead of the live API.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Path to the DuckDB asset database.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Key/value table format for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score search candidates for a free-form query.
    ///
    /// Runs the provider search and ranks candidates with the same tiered
    /// scoring used by enrichment, without touching the store.
    ///
    /// # Examples
    ///
    ///   assayer search apple
    ///   assayer search "gold etf" --limit 5
    Search(SearchArgs),

    /// Enrichment commands over one of the supported scopes.
    Enrich(EnrichArgs),
}

/// Arguments for the `search` command.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-form search query (ticker, company name or ISIN).
    pub query: String,

    /// Maximum number of candidates to return.
    #[arg(long, default_value_t = 15)]
    pub limit: usize,
}

/// Arguments for the `enrich` command group.
#[derive(Debug, Args)]
pub struct EnrichArgs {
    #[command(subcommand)]
    pub command: EnrichCommand,
}

/// Enrichment subcommands, one per scope.
#[derive(Debug, Subcommand)]
pub enum EnrichCommand {
    /// Enrich one stored asset by id.
    ///
    /// # Examples
    ///
    ///   assayer enrich asset 7c9e6679-7425-40de-944b-e07fc1f90ae7
    ///   assayer enrich asset 7c9e6679-... --ticker AAPL.US
    Asset(AssetArgs),

    /// Resolve a query within a portfolio, inserting a new asset on miss.
    ///
    /// Looks the query up among the portfolio's assets first (name, ticker
    /// and ISIN, case-insensitive). When nothing matches, a new asset is
    /// created from the resolved identity.
    ///
    /// # Examples
    ///
    ///   assayer enrich query "Apple" --portfolio p-1
    ///   assayer enrich query "VWCE" --portfolio p-1 --exchange XETRA
    Query(QueryArgs),

    /// Enrich every asset in a portfolio.
    ///
    /// Fully enriched assets are skipped unless --include-enriched is set.
    ///
    /// # Examples
    ///
    ///   assayer enrich portfolio p-1
    ///   assayer enrich portfolio p-1 --include-enriched --concurrency 4
    Portfolio(PortfolioArgs),

    /// Enrich every asset owned by a company.
    Company(CompanyArgs),

    /// Enrich all portfolios linked to a customer profile.
    Customer(CustomerArgs),
}

/// Arguments for `enrich asset`.
#[derive(Debug, Args)]
pub struct AssetArgs {
    /// Asset id to enrich.
    pub asset_id: String,

    /// Override the search query derived from the stored record.
    #[arg(long)]
    pub query: Option<String>,

    /// Preferred exchange code for resolution.
    #[arg(long)]
    pub exchange: Option<String>,

    /// Known canonical ticker (CODE.EXCHANGE); skips the search.
    #[arg(long)]
    pub ticker: Option<String>,
}

/// Arguments for `enrich query`.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Free-form query resolved against the portfolio and search index.
    pub query: String,

    /// Portfolio the asset belongs to (or is inserted into).
    #[arg(long)]
    pub portfolio: String,

    /// Company id attached to a newly inserted asset.
    #[arg(long)]
    pub company: Option<i64>,

    /// Preferred exchange code for resolution.
    #[arg(long)]
    pub exchange: Option<String>,
}

/// Arguments for `enrich portfolio`.
#[derive(Debug, Args)]
pub struct PortfolioArgs {
    /// Portfolio id to enrich.
    pub portfolio_id: String,

    /// Also re-enrich assets that already have all enrichment fields.
    #[arg(long, default_value_t = false)]
    pub include_enriched: bool,

    /// Number of assets processed in parallel.
    #[arg(long)]
    pub concurrency: Option<NonZeroUsize>,

    /// Preferred exchange code for resolution.
    #[arg(long)]
    pub exchange: Option<String>,
}

/// Arguments for `enrich company`.
#[derive(Debug, Args)]
pub struct CompanyArgs {
    /// Company id whose assets are enriched.
    pub company_id: i64,

    /// Also re-enrich assets that already have all enrichment fields.
    #[arg(long, default_value_t = false)]
    pub include_enriched: bool,

    /// Number of assets processed in parallel.
    #[arg(long)]
    pub concurrency: Option<NonZeroUsize>,

    /// Preferred exchange code for resolution.
    #[arg(long)]
    pub exchange: Option<String>,
}

/// Arguments for `enrich customer`.
#[derive(Debug, Args)]
pub struct CustomerArgs {
    /// Customer id whose linked portfolios are enriched.
    pub customer_id: i64,

    /// Also re-enrich assets that already have all enrichment fields.
    #[arg(long, default_value_t = false)]
    pub include_enriched: bool,

    /// Number of assets processed in parallel.
    #[arg(long)]
    pub concurrency: Option<NonZeroUsize>,

    /// Preferred exchange code for resolution.
    #[arg(long)]
    pub exchange: Option<String>,
}
