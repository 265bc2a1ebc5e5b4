//! Canonical ticker resolution.
//!
//! Two paths produce a [`ResolvedTicker`]: the fast path reuses a stored or
//! overridden canonical ticker, the search path assembles one from the best
//! match. Either way the resolved exchange code may differ from the ticker's
//! own exchange segment when an override is in play; the merge builder uses
//! the resolved code, while the ticker string stays as given.

use crate::domain::{AssetRecord, CanonicalTicker, SearchCandidate};
use crate::error::EnrichError;
use crate::merge::pick_value;

/// The outcome of ticker resolution for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTicker {
    pub ticker: CanonicalTicker,
    pub exchange_code: String,
}

/// Fast path: a canonical ticker is already known.
pub fn resolve_known_ticker(
    raw: &str,
    exchange_override: Option<&str>,
) -> Result<ResolvedTicker, EnrichError> {
    let ticker = CanonicalTicker::parse(raw)?;
    let exchange_code = pick_value(&[exchange_override, Some(ticker.exchange())])
        .ok_or(EnrichError::MissingTickerOrExchange)?;
    Ok(ResolvedTicker {
        ticker,
        exchange_code,
    })
}

/// Search path: build the canonical ticker from the selected candidate.
///
/// Exchange preference order: explicit override, the asset's stored exchange
/// code, the candidate's exchange, then the asset's exchange display name.
pub fn resolve_from_candidate(
    candidate: &SearchCandidate,
    asset: &AssetRecord,
    exchange_override: Option<&str>,
) -> Result<ResolvedTicker, EnrichError> {
    let code =
        pick_value(&[candidate.code.as_deref()]).ok_or(EnrichError::MissingTickerOrExchange)?;
    let exchange_code = pick_value(&[
        exchange_override,
        asset.exchange_code.as_deref(),
        candidate.exchange.as_deref(),
        asset.exchange.as_deref(),
    ])
    .ok_or(EnrichError::MissingTickerOrExchange)?;

    let ticker = CanonicalTicker::from_parts(&code, &exchange_code)?;
    Ok(ResolvedTicker {
        ticker,
        exchange_code,
    })
}
