//! Domain model: asset records, canonical tickers and provider payloads.

mod asset;
mod payloads;
mod ticker;

pub use asset::{AssetClass, AssetPatch, AssetRecord, ENRICHED_FIELDS};
pub use payloads::{ExchangeTickerEntry, FundamentalsPayload, GeneralInfo, SearchCandidate};
pub use ticker::CanonicalTicker;

pub(crate) use asset::has_text;
