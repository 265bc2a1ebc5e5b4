use thiserror::Error;

use crate::data_source::SourceError;
use crate::request::EnrichScope;
use crate::store::StoreError;

/// Enrichment error taxonomy.
///
/// Request-boundary failures (validation, not-found) abort the whole request;
/// everything else is captured per asset by the batch orchestrator.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("{scope} scope requires {field}")]
    MissingScopeId {
        scope: EnrichScope,
        field: &'static str,
    },

    #[error("asset '{0}' not found")]
    AssetNotFound(String),

    #[error("no assets found for {scope} '{id}'")]
    NoAssetsInScope { scope: EnrichScope, id: String },

    #[error("no portfolios found for customer '{0}'")]
    NoPortfoliosForCustomer(i64),

    #[error("no query available: asset has no name, ticker or ISIN")]
    MissingQuery,

    #[error("no confident match for query '{query}'")]
    NoConfidentMatch { query: String },

    #[error("invalid canonical ticker '{ticker}': expected CODE.EXCHANGE")]
    InvalidTickerFormat { ticker: String },

    #[error("matched candidate is missing a ticker code or exchange code")]
    MissingTickerOrExchange,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl EnrichError {
    /// Caller-input problems that should abort a request up front.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::MissingScopeId { .. })
    }

    /// Scope lookups that produced nothing to work on.
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AssetNotFound(_) | Self::NoAssetsInScope { .. } | Self::NoPortfoliosForCustomer(_)
        )
    }
}
