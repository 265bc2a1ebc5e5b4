//! Single-asset enrichment orchestration.
//!
//! The decision tree per asset: reuse a known canonical ticker when one is
//! stored or overridden (fast path, no search call), otherwise resolve the
//! identity through the search index. Both paths then fan out to the
//! exchange listing and fundamentals in parallel and feed the merge builder.

use std::sync::Arc;

use crate::data_source::{
    ExchangeTickersRequest, FundamentalsRequest, MarketDataSource,
};
use crate::domain::{AssetPatch, AssetRecord, ExchangeTickerEntry, FundamentalsPayload};
use crate::error::EnrichError;
use crate::matching::{find_best_match, ScoredCandidate};
use crate::merge::{build_asset_patch, pick_value, MergeInputs};
use crate::resolver::{resolve_from_candidate, resolve_known_ticker, ResolvedTicker};
use crate::store::AssetStore;

/// Per-request overrides threaded into each asset's enrichment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichOverrides<'a> {
    pub query: Option<&'a str>,
    pub exchange: Option<&'a str>,
    pub ticker: Option<&'a str>,
}

/// The enrichment result for one asset before persistence.
#[derive(Debug, Clone)]
pub(crate) struct EnrichedAsset {
    pub patch: AssetPatch,
    pub resolved: ResolvedTicker,
    /// Present when the search path ran.
    pub matched: Option<ScoredCandidate>,
}

/// Identity-resolution and merge engine over a store and a market-data
/// source. Cheap to clone; both members are shared.
#[derive(Clone)]
pub struct EnrichmentEngine {
    store: Arc<dyn AssetStore>,
    source: Arc<dyn MarketDataSource>,
}

impl EnrichmentEngine {
    pub fn new(store: Arc<dyn AssetStore>, source: Arc<dyn MarketDataSource>) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    pub fn source(&self) -> &Arc<dyn MarketDataSource> {
        &self.source
    }

    /// Resolves an identity and builds the merge patch for one asset.
    ///
    /// # Errors
    ///
    /// `MissingQuery` when neither a ticker nor any query text exists;
    /// `NoConfidentMatch` when the search index has nothing usable;
    /// ticker-shape errors from resolution.
    pub(crate) async fn enrich_step(
        &self,
        asset: &AssetRecord,
        overrides: EnrichOverrides<'_>,
    ) -> Result<EnrichedAsset, EnrichError> {
        let known_ticker = pick_value(&[overrides.ticker, asset.ticker_eod.as_deref()]);

        let (resolved, matched) = match known_ticker {
            Some(raw) => {
                let resolved = resolve_known_ticker(&raw, overrides.exchange)?;
                tracing::debug!(asset_id = %asset.id, ticker = %resolved.ticker, "fast-path ticker");
                (resolved, None)
            }
            None => {
                let query = pick_value(&[
                    overrides.query,
                    asset.name.as_deref(),
                    asset.ticker.as_deref(),
                    asset.isin.as_deref(),
                ])
                .ok_or(EnrichError::MissingQuery)?;

                let best = find_best_match(self.source.as_ref(), &query)
                    .await
                    .ok_or(EnrichError::NoConfidentMatch {
                        query: query.clone(),
                    })?;
                let resolved =
                    resolve_from_candidate(&best.candidate, asset, overrides.exchange)?;
                tracing::debug!(
                    asset_id = %asset.id,
                    query,
                    ticker = %resolved.ticker,
                    score = best.score,
                    "search-path match"
                );
                (resolved, Some(best))
            }
        };

        let (exchange_entry, fundamentals) = self.lookup_context(&resolved).await;

        let patch = build_asset_patch(&MergeInputs {
            asset,
            candidate: matched.as_ref().map(|m| &m.candidate),
            ticker: &resolved.ticker,
            exchange_code: &resolved.exchange_code,
            exchange_entry: exchange_entry.as_ref(),
            fundamentals: fundamentals.as_ref(),
        });

        Ok(EnrichedAsset {
            patch,
            resolved,
            matched,
        })
    }

    /// Fetches the exchange listing and fundamentals in parallel.
    ///
    /// Both lookups are advisory: a failure on either side degrades the
    /// merge inputs instead of failing the asset.
    async fn lookup_context(
        &self,
        resolved: &ResolvedTicker,
    ) -> (Option<ExchangeTickerEntry>, Option<FundamentalsPayload>) {
        let tickers_future = async {
            let request = match ExchangeTickersRequest::new(resolved.exchange_code.clone()) {
                Ok(request) => request,
                Err(_) => return None,
            };
            match self.source.exchange_tickers(request).await {
                Ok(batch) => Some(batch),
                Err(error) => {
                    tracing::warn!(
                        exchange = %resolved.exchange_code,
                        error = %error,
                        "exchange listing lookup failed"
                    );
                    None
                }
            }
        };

        let fundamentals_future = async {
            let request = FundamentalsRequest::new(resolved.ticker.clone());
            match self.source.fundamentals(request).await {
                Ok(payload) => payload,
                Err(error) => {
                    tracing::warn!(
                        ticker = %resolved.ticker,
                        error = %error,
                        "fundamentals lookup failed"
                    );
                    None
                }
            }
        };

        let (listing, fundamentals) = tokio::join!(tickers_future, fundamentals_future);

        let code = resolved.ticker.code();
        let entry = listing.and_then(|batch| {
            batch
                .entries
                .into_iter()
                .find(|entry| entry.code.as_deref() == Some(code))
        });

        (entry, fundamentals)
    }
}
