//! Market-data source trait and request/response types.
//!
//! This module defines the adapter contract ([`MarketDataSource`]) that
//! provider implementations follow, together with the request and response
//! types for each endpoint.
//!
//! # Endpoints
//!
//! | Endpoint | Request | Response | Description |
//! |----------|---------|----------|-------------|
//! | Search | [`SearchRequest`] | [`SearchBatch`] | Instrument search index |
//! | ExchangeTickers | [`ExchangeTickersRequest`] | [`ExchangeTickerBatch`] | Venue symbol listing |
//! | Fundamentals | [`FundamentalsRequest`] | `Option<FundamentalsPayload>` | Company profile |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::domain::{CanonicalTicker, ExchangeTickerEntry, FundamentalsPayload, SearchCandidate};
use crate::source::ProviderId;

/// Data endpoint type used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Search,
    ExchangeTickers,
    Fundamentals,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::ExchangeTickers => "exchange_tickers",
            Self::Fundamentals => "fundamentals",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported endpoint matrix for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub search: bool,
    pub exchange_tickers: bool,
    pub fundamentals: bool,
}

impl CapabilitySet {
    pub const fn new(search: bool, exchange_tickers: bool, fundamentals: bool) -> Self {
        Self {
            search,
            exchange_tickers,
            fundamentals,
        }
    }

    pub const fn full() -> Self {
        Self::new(true, true, true)
    }

    pub const fn supports(self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Search => self.search,
            Endpoint::ExchangeTickers => self.exchange_tickers,
            Endpoint::Fundamentals => self.fundamentals,
        }
    }
}

/// Health state reported by `health()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Runtime source health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub rate_available: bool,
}

impl HealthStatus {
    pub const fn new(state: HealthState, rate_available: bool) -> Self {
        Self {
            state,
            rate_available,
        }
    }

    pub const fn healthy() -> Self {
        Self::new(HealthState::Healthy, true)
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    UnsupportedEndpoint,
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unsupported_endpoint(endpoint: Endpoint) -> Self {
        Self {
            kind: SourceErrorKind::UnsupportedEndpoint,
            message: format!("endpoint '{endpoint}' is not supported by this source"),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::UnsupportedEndpoint => "source.unsupported_endpoint",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
}

impl SearchRequest {
    pub const DEFAULT_LIMIT: usize = 15;

    pub fn new(query: impl Into<String>, limit: usize) -> Result<Self, SourceError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(SourceError::invalid_request(
                "search query must not be empty",
            ));
        }
        if limit == 0 {
            return Err(SourceError::invalid_request(
                "search request limit must be greater than zero",
            ));
        }
        Ok(Self { query, limit })
    }
}

/// Request payload for an exchange symbol listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeTickersRequest {
    pub exchange_code: String,
}

impl ExchangeTickersRequest {
    pub fn new(exchange_code: impl Into<String>) -> Result<Self, SourceError> {
        let exchange_code = exchange_code.into();
        if exchange_code.trim().is_empty() {
            return Err(SourceError::invalid_request(
                "exchange tickers request requires an exchange code",
            ));
        }
        Ok(Self { exchange_code })
    }
}

/// Request payload for the fundamentals endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundamentalsRequest {
    pub ticker: CanonicalTicker,
}

impl FundamentalsRequest {
    pub const fn new(ticker: CanonicalTicker) -> Self {
        Self { ticker }
    }
}

/// Scored-unsorted search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBatch {
    pub query: String,
    pub candidates: Vec<SearchCandidate>,
}

/// Exchange listing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeTickerBatch {
    pub exchange_code: String,
    pub entries: Vec<ExchangeTickerEntry>,
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; methods return boxed futures so
/// the trait stays object-safe behind `Arc<dyn MarketDataSource>`.
pub trait MarketDataSource: Send + Sync {
    /// Unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Supported endpoint matrix.
    fn capabilities(&self) -> CapabilitySet;

    /// Queries the instrument search index.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failure, rate limiting, or an
    /// invalid query.
    fn search<'a>(
        &'a self,
        req: SearchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SearchBatch, SourceError>> + Send + 'a>>;

    /// Fetches the full symbol listing for one exchange.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failure or rate limiting.
    fn exchange_tickers<'a>(
        &'a self,
        req: ExchangeTickersRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ExchangeTickerBatch, SourceError>> + Send + 'a>>;

    /// Fetches the fundamentals document for a canonical ticker.
    ///
    /// A ticker with no fundamentals coverage resolves to `Ok(None)`, not an
    /// error: fundamentals are advisory for the merge.
    fn fundamentals<'a>(
        &'a self,
        req: FundamentalsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<FundamentalsPayload>, SourceError>> + Send + 'a>>;

    /// Current health snapshot for this source.
    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>>;
}
