//! # Assayer Store
//!
//! DuckDB-backed persistence for asset records.
//!
//! The crate implements [`AssetStore`] from `assayer-core` on top of a small
//! `DuckDB` connection pool with versioned schema migrations. All user input
//! reaches the database through parameterized queries.

pub mod duckdb;
pub mod migrations;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{Row, ToSql};
use serde_json::Value;

use assayer_core::domain::{AssetClass, AssetPatch, AssetRecord};
use assayer_core::store::{AssetStore, StoreError};

pub use crate::duckdb::{DuckDbConnectionManager, PooledConnection};

const ASSET_COLUMNS: &str = "id, portfolio_id, company_id, ticker, name, exchange, \
     exchange_code, country, country_name, category, sector, industry, description, \
     officers, owner_comment, currency, ticker_eod, isin, asset_class, website_url, \
     logo_url, fiscal_year_end, other_listings, watchlist";

/// Configuration for the asset database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for assayer data.
    pub assayer_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections in the pool.
    pub max_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let assayer_home = resolve_assayer_home();
        let db_path = assayer_home.join("assets.duckdb");
        Self {
            assayer_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl StoreConfig {
    /// A configuration rooted at an explicit database path.
    pub fn at_path(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let assayer_home = db_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self {
            assayer_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

/// `DuckDB` implementation of the asset store.
#[derive(Clone)]
pub struct DuckDbAssetStore {
    manager: DuckDbConnectionManager,
}

impl DuckDbAssetStore {
    /// Open a store with default configuration.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(StoreConfig::default())
    }

    /// Open a store, creating the database file and schema when missing.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| StoreError::Unavailable(error.to_string()))?;
        }

        let manager = DuckDbConnectionManager::new(config.db_path.clone(), config.max_pool_size);
        let store = Self { manager };
        store.initialize()?;
        tracing::debug!(db_path = %config.db_path.display(), "asset store opened");
        Ok(store)
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let connection = self.acquire()?;
        migrations::apply_migrations(&connection)
            .map_err(|error| StoreError::Unavailable(error.to_string()))
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Associate a portfolio with a customer profile. Idempotent.
    pub fn link_portfolio(&self, customer_id: i64, portfolio_id: &str) -> Result<(), StoreError> {
        let connection = self.acquire()?;
        let params: [&dyn ToSql; 2] = [&customer_id, &portfolio_id];
        connection
            .execute(
                "INSERT OR IGNORE INTO portfolio_links (customer_id, portfolio_id) VALUES (?, ?)",
                params.as_slice(),
            )
            .map_err(write_error)?;
        Ok(())
    }

    fn acquire(&self) -> Result<PooledConnection, StoreError> {
        self.manager
            .acquire()
            .map_err(|error| StoreError::Unavailable(error.to_string()))
    }

    fn query_assets(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<AssetRecord>, StoreError> {
        let connection = self.acquire()?;
        let mut statement = connection.prepare(sql).map_err(query_error)?;
        let mut rows = statement.query(params).map_err(query_error)?;

        let mut assets = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            assets.push(row_to_asset(row).map_err(query_error)?);
        }
        Ok(assets)
    }
}

impl AssetStore for DuckDbAssetStore {
    fn load_asset(&self, id: &str) -> Result<Option<AssetRecord>, StoreError> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?");
        let params: [&dyn ToSql; 1] = [&id];
        Ok(self.query_assets(sql.as_str(), params.as_slice())?.pop())
    }

    fn load_assets_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<AssetRecord>, StoreError> {
        let sql =
            format!("SELECT {ASSET_COLUMNS} FROM assets WHERE portfolio_id = ? ORDER BY id");
        let params: [&dyn ToSql; 1] = [&portfolio_id];
        self.query_assets(sql.as_str(), params.as_slice())
    }

    fn load_assets_by_company(&self, company_id: i64) -> Result<Vec<AssetRecord>, StoreError> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE company_id = ? ORDER BY id");
        let params: [&dyn ToSql; 1] = [&company_id];
        self.query_assets(sql.as_str(), params.as_slice())
    }

    fn load_portfolio_ids_for_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<String>, StoreError> {
        let connection = self.acquire()?;
        let mut statement = connection
            .prepare(
                "SELECT portfolio_id FROM portfolio_links WHERE customer_id = ? ORDER BY portfolio_id",
            )
            .map_err(query_error)?;
        let params: [&dyn ToSql; 1] = [&customer_id];
        let mut rows = statement.query(params.as_slice()).map_err(query_error)?;

        let mut portfolio_ids = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            portfolio_ids.push(row.get(0).map_err(query_error)?);
        }
        Ok(portfolio_ids)
    }

    fn find_asset_in_portfolio(
        &self,
        portfolio_id: &str,
        query: &str,
    ) -> Result<Option<AssetRecord>, StoreError> {
        let pattern = format!("%{}%", query.trim().to_lowercase());
        let sql = format!(
            "SELECT {ASSET_COLUMNS} FROM assets \
             WHERE portfolio_id = ? \
               AND (lower(name) LIKE ? OR lower(ticker) LIKE ? OR lower(isin) LIKE ?) \
             ORDER BY id LIMIT 1"
        );
        let params: [&dyn ToSql; 4] = [&portfolio_id, &pattern, &pattern, &pattern];
        Ok(self.query_assets(sql.as_str(), params.as_slice())?.pop())
    }

    fn upsert_asset(&self, id: &str, patch: &AssetPatch) -> Result<AssetRecord, StoreError> {
        let mut record = self
            .load_asset(id)?
            .ok_or_else(|| StoreError::MissingRow(id.to_string()))?;
        record.apply_patch(patch);

        let officers_json = json_text(record.officers.as_ref());
        let listings_json = json_text(record.other_listings.as_ref());
        let asset_class = record.asset_class.map(AssetClass::as_str);

        let connection = self.acquire()?;
        let params: [&dyn ToSql; 23] = [
            &record.portfolio_id,
            &record.company_id,
            &record.ticker,
            &record.name,
            &record.exchange,
            &record.exchange_code,
            &record.country,
            &record.country_name,
            &record.category,
            &record.sector,
            &record.industry,
            &record.description,
            &officers_json,
            &record.owner_comment,
            &record.currency,
            &record.ticker_eod,
            &record.isin,
            &asset_class,
            &record.website_url,
            &record.logo_url,
            &record.fiscal_year_end,
            &listings_json,
            &record.id,
        ];
        connection
            .execute(
                "UPDATE assets SET \
                 portfolio_id = ?, company_id = ?, ticker = ?, name = ?, exchange = ?, \
                 exchange_code = ?, country = ?, country_name = ?, category = ?, sector = ?, \
                 industry = ?, description = ?, officers = ?, owner_comment = ?, currency = ?, \
                 ticker_eod = ?, isin = ?, asset_class = ?, website_url = ?, logo_url = ?, \
                 fiscal_year_end = ?, other_listings = ?, updated_at = CURRENT_TIMESTAMP \
                 WHERE id = ?",
                params.as_slice(),
            )
            .map_err(write_error)?;

        Ok(record)
    }

    fn insert_asset(&self, record: &AssetRecord) -> Result<AssetRecord, StoreError> {
        let officers_json = json_text(record.officers.as_ref());
        let listings_json = json_text(record.other_listings.as_ref());
        let asset_class = record.asset_class.map(AssetClass::as_str);

        let connection = self.acquire()?;
        let params: [&dyn ToSql; 24] = [
            &record.id,
            &record.portfolio_id,
            &record.company_id,
            &record.ticker,
            &record.name,
            &record.exchange,
            &record.exchange_code,
            &record.country,
            &record.country_name,
            &record.category,
            &record.sector,
            &record.industry,
            &record.description,
            &officers_json,
            &record.owner_comment,
            &record.currency,
            &record.ticker_eod,
            &record.isin,
            &asset_class,
            &record.website_url,
            &record.logo_url,
            &record.fiscal_year_end,
            &listings_json,
            &record.watchlist,
        ];
        connection
            .execute(
                "INSERT INTO assets \
                 (id, portfolio_id, company_id, ticker, name, exchange, exchange_code, country, \
                  country_name, category, sector, industry, description, officers, owner_comment, \
                  currency, ticker_eod, isin, asset_class, website_url, logo_url, fiscal_year_end, \
                  other_listings, watchlist, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, \
                  CURRENT_TIMESTAMP)",
                params.as_slice(),
            )
            .map_err(write_error)?;

        Ok(record.clone())
    }
}

fn query_error(error: ::duckdb::Error) -> StoreError {
    StoreError::Query(error.to_string())
}

fn write_error(error: ::duckdb::Error) -> StoreError {
    StoreError::Write(error.to_string())
}

fn json_text(value: Option<&Value>) -> Option<String> {
    value.map(Value::to_string)
}

fn row_to_asset(row: &Row<'_>) -> Result<AssetRecord, ::duckdb::Error> {
    Ok(AssetRecord {
        id: row.get(0)?,
        portfolio_id: row.get(1)?,
        company_id: row.get(2)?,
        ticker: row.get(3)?,
        name: row.get(4)?,
        exchange: row.get(5)?,
        exchange_code: row.get(6)?,
        country: row.get(7)?,
        country_name: row.get(8)?,
        category: row.get(9)?,
        sector: row.get(10)?,
        industry: row.get(11)?,
        description: row.get(12)?,
        officers: parse_json_column(row.get(13)?),
        owner_comment: row.get(14)?,
        currency: row.get(15)?,
        ticker_eod: row.get(16)?,
        isin: row.get(17)?,
        asset_class: row
            .get::<_, Option<String>>(18)?
            .as_deref()
            .and_then(AssetClass::from_stored),
        website_url: row.get(19)?,
        logo_url: row.get(20)?,
        fiscal_year_end: row.get(21)?,
        other_listings: parse_json_column(row.get(22)?),
        watchlist: row.get::<_, Option<bool>>(23)?.unwrap_or(false),
    })
}

/// Stored JSON columns that fail to parse read back as absent rather than
/// poisoning the whole row.
fn parse_json_column(text: Option<String>) -> Option<Value> {
    text.as_deref().and_then(|text| {
        let value = serde_json::from_str(text);
        if value.is_err() {
            tracing::warn!("ignoring malformed JSON column value");
        }
        value.ok()
    })
}

/// Resolve the assayer home directory from environment or default.
fn resolve_assayer_home() -> PathBuf {
    if let Some(path) = env::var_os("ASSAYER_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".assayer");
    }

    PathBuf::from(".assayer")
}
