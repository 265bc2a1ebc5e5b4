//! Persistence boundary for asset records.
//!
//! The engine only ever talks to this trait; the DuckDB implementation lives
//! in `assayer-store`, and tests substitute an in-memory double.

use thiserror::Error;

use crate::domain::{AssetPatch, AssetRecord};

/// Store-level error classification, kept free of backend types so the
/// engine does not depend on any particular database crate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("store write failed: {0}")]
    Write(String),

    #[error("asset '{0}' does not exist")]
    MissingRow(String),
}

/// Asset persistence contract.
///
/// All lookups return owned records; `upsert_asset` applies a patch and
/// returns the refreshed row so callers can report the post-merge state.
pub trait AssetStore: Send + Sync {
    fn load_asset(&self, id: &str) -> Result<Option<AssetRecord>, StoreError>;

    fn load_assets_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<AssetRecord>, StoreError>;

    fn load_assets_by_company(&self, company_id: i64) -> Result<Vec<AssetRecord>, StoreError>;

    /// Portfolio ids associated with a customer profile.
    fn load_portfolio_ids_for_customer(&self, customer_id: i64)
        -> Result<Vec<String>, StoreError>;

    /// Case-insensitive substring lookup over name, ticker and ISIN within
    /// one portfolio. Used by single-scope insert-on-resolve to avoid
    /// creating duplicates.
    fn find_asset_in_portfolio(
        &self,
        portfolio_id: &str,
        query: &str,
    ) -> Result<Option<AssetRecord>, StoreError>;

    fn upsert_asset(&self, id: &str, patch: &AssetPatch) -> Result<AssetRecord, StoreError>;

    fn insert_asset(&self, record: &AssetRecord) -> Result<AssetRecord, StoreError>;
}
