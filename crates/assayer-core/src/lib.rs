//! # Assayer Core
//!
//! Asset identity-resolution and enrichment-merge engine.
//!
//! Sparse, user-entered asset descriptions are matched against a provider
//! search index, resolved to a canonical `CODE.EXCHANGE` ticker, enriched
//! from the exchange listing and company fundamentals, and merged back into
//! the stored record under deterministic field-precedence rules.
//!
//! ## Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | Normalize + score | [`matching`] | Tiered candidate scoring with a confidence floor |
//! | Resolve | [`resolver`] | Fast-path and search-path ticker resolution |
//! | Fetch | [`adapters`] | EODHD adapter behind [`MarketDataSource`] |
//! | Merge | [`merge`] | Table-driven field precedence |
//! | Orchestrate | [`enrich`], [`batch`] | Single-asset flow and scoped batch runs |
//!
//! Persistence goes through the [`AssetStore`] trait; the DuckDB
//! implementation lives in the `assayer-store` crate.

pub mod adapters;
pub mod batch;
pub mod circuit_breaker;
pub mod data_source;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod http_client;
pub mod matching;
pub mod merge;
pub mod provider_policy;
pub mod request;
pub mod resolver;
pub mod source;
pub mod store;
pub mod throttling;

pub use adapters::EodhdAdapter;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use data_source::{
    CapabilitySet, Endpoint, ExchangeTickerBatch, ExchangeTickersRequest, FundamentalsRequest,
    HealthState, HealthStatus, MarketDataSource, SearchBatch, SearchRequest, SourceError,
    SourceErrorKind,
};
pub use domain::{
    AssetClass, AssetPatch, AssetRecord, CanonicalTicker, ExchangeTickerEntry,
    FundamentalsPayload, GeneralInfo, SearchCandidate, ENRICHED_FIELDS,
};
pub use enrich::{EnrichOverrides, EnrichmentEngine};
pub use error::EnrichError;
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
pub use matching::{
    find_best_match, normalize_text, score_and_rank, score_match, ScoredCandidate,
    CONFIDENCE_FLOOR,
};
pub use merge::{build_asset_patch, pick_value, MergeInputs};
pub use provider_policy::ProviderPolicy;
pub use request::{
    BatchOptions, BatchSummary, EnrichOutcome, EnrichReport, EnrichRequest, EnrichScope,
    OutcomeStatus,
};
pub use resolver::{resolve_from_candidate, resolve_known_ticker, ResolvedTicker};
pub use source::ProviderId;
pub use store::{AssetStore, StoreError};
pub use throttling::RequestBudget;
