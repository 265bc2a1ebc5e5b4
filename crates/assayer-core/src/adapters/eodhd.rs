use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::data_source::{
    CapabilitySet, ExchangeTickerBatch, ExchangeTickersRequest, FundamentalsRequest, HealthState,
    HealthStatus, MarketDataSource, SearchBatch, SearchRequest, SourceError,
};
use crate::domain::{ExchangeTickerEntry, FundamentalsPayload, GeneralInfo, SearchCandidate};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::source::ProviderId;
use crate::throttling::RequestBudget;

const API_BASE: &str = "https://eodhd.com/api";

/// EODHD adapter supporting both real API calls and mock mode.
///
/// With a real transport the three endpoints are fetched from
/// `eodhd.com/api`; with a mock transport a deterministic instrument catalog
/// serves offline tests while still exercising throttling and the circuit
/// breaker.
#[derive(Clone)]
pub struct EodhdAdapter {
    health_state: HealthState,
    rate_available: bool,
    http_client: Arc<dyn HttpClient>,
    api_token: String,
    circuit_breaker: Arc<CircuitBreaker>,
    budget: RequestBudget,
    use_real_api: bool,
}

impl Default for EodhdAdapter {
    fn default() -> Self {
        let policy = ProviderPolicy::eodhd_default();
        Self {
            health_state: HealthState::Healthy,
            rate_available: true,
            http_client: Arc::new(NoopHttpClient),
            api_token: std::env::var("ASSAYER_EODHD_API_KEY")
                .unwrap_or_else(|_| String::from("demo")),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            budget: RequestBudget::from_policy(&policy),
            use_real_api: false,
        }
    }
}

impl EodhdAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_token: impl Into<String>) -> Self {
        let is_real = !http_client.is_mock();
        Self {
            http_client,
            api_token: api_token.into(),
            use_real_api: is_real,
            ..Self::default()
        }
    }

    pub fn with_circuit_breaker(circuit_breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            circuit_breaker,
            ..Self::default()
        }
    }

    pub fn with_health(health_state: HealthState, rate_available: bool) -> Self {
        Self {
            health_state,
            rate_available,
            ..Self::default()
        }
    }

    fn is_real_client(&self) -> bool {
        self.use_real_api
    }

    fn with_api_token(&self, endpoint: &str) -> String {
        if endpoint.contains('?') {
            format!("{endpoint}&api_token={}&fmt=json", self.api_token)
        } else {
            format!("{endpoint}?api_token={}&fmt=json", self.api_token)
        }
    }

    /// Circuit and budget gate applied before every upstream call.
    fn guard_upstream(&self) -> Result<(), SourceError> {
        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::unavailable("eodhd circuit breaker is open"));
        }
        if let Err(wait) = self.budget.try_acquire() {
            return Err(SourceError::rate_limited(format!(
                "eodhd quota exhausted; budget refills in {:.2}s",
                wait.as_secs_f64()
            )));
        }
        Ok(())
    }

    /// Executes a guarded GET and returns the raw body. A 404 is reported
    /// as `Ok(None)` so callers can treat missing documents as advisory.
    async fn execute_get(&self, endpoint: &str) -> Result<Option<String>, SourceError> {
        self.guard_upstream()?;

        let request = HttpRequest::get(self.with_api_token(endpoint));
        let response = self.http_client.execute(request).await.map_err(|error| {
            self.circuit_breaker.record_failure();
            if error.retryable() {
                SourceError::unavailable(format!("eodhd transport error: {}", error.message()))
            } else {
                SourceError::internal(format!("eodhd transport error: {}", error.message()))
            }
        })?;

        if response.is_not_found() {
            self.circuit_breaker.record_success();
            return Ok(None);
        }
        if !response.is_success() {
            self.circuit_breaker.record_failure();
            return Err(SourceError::unavailable(format!(
                "eodhd upstream returned status {}",
                response.status
            )));
        }

        self.circuit_breaker.record_success();
        Ok(Some(response.body))
    }
}

// Real API implementation.
impl EodhdAdapter {
    async fn execute_real_search(&self, req: &SearchRequest) -> Result<SearchBatch, SourceError> {
        let endpoint = format!(
            "{API_BASE}/search/{}?limit={}",
            urlencoding::encode(req.query.trim()),
            req.limit
        );
        let body = self
            .execute_get(&endpoint)
            .await?
            .unwrap_or_else(|| String::from("[]"));

        let candidates: Vec<SearchCandidate> = serde_json::from_str(&body)
            .map_err(|e| SourceError::internal(format!("failed to parse eodhd search response: {e}")))?;

        Ok(SearchBatch {
            query: req.query.clone(),
            candidates,
        })
    }

    async fn fetch_real_exchange_tickers(
        &self,
        req: &ExchangeTickersRequest,
    ) -> Result<ExchangeTickerBatch, SourceError> {
        let endpoint = format!(
            "{API_BASE}/exchange-symbol-list/{}",
            urlencoding::encode(req.exchange_code.trim())
        );
        let body = self
            .execute_get(&endpoint)
            .await?
            .unwrap_or_else(|| String::from("[]"));

        let entries: Vec<ExchangeTickerEntry> = serde_json::from_str(&body).map_err(|e| {
            SourceError::internal(format!("failed to parse eodhd exchange listing: {e}"))
        })?;

        Ok(ExchangeTickerBatch {
            exchange_code: req.exchange_code.clone(),
            entries,
        })
    }

    async fn fetch_real_fundamentals(
        &self,
        req: &FundamentalsRequest,
    ) -> Result<Option<FundamentalsPayload>, SourceError> {
        let endpoint = format!(
            "{API_BASE}/fundamentals/{}",
            urlencoding::encode(req.ticker.as_str())
        );
        let Some(body) = self.execute_get(&endpoint).await? else {
            return Ok(None);
        };
        if body.trim().is_empty() || body.trim() == "{}" {
            return Ok(None);
        }

        let payload: FundamentalsPayload = serde_json::from_str(&body).map_err(|e| {
            SourceError::internal(format!("failed to parse eodhd fundamentals: {e}"))
        })?;
        Ok(Some(payload))
    }
}

// Mock catalog (deterministic offline data).
impl EodhdAdapter {
    async fn execute_mock_search(&self, req: &SearchRequest) -> Result<SearchBatch, SourceError> {
        self.execute_get(&format!("{API_BASE}/search/mock")).await?;

        let needle = req.query.trim().to_ascii_lowercase();
        let candidates = eodhd_catalog()
            .into_iter()
            .filter(|entry| {
                entry.code.to_ascii_lowercase().contains(&needle)
                    || entry.name.to_ascii_lowercase().contains(&needle)
            })
            .map(CatalogEntry::into_candidate)
            .take(req.limit)
            .collect();

        Ok(SearchBatch {
            query: req.query.clone(),
            candidates,
        })
    }

    async fn fetch_mock_exchange_tickers(
        &self,
        req: &ExchangeTickersRequest,
    ) -> Result<ExchangeTickerBatch, SourceError> {
        self.execute_get(&format!("{API_BASE}/exchange-symbol-list/mock"))
            .await?;

        let entries = eodhd_catalog()
            .into_iter()
            .filter(|entry| entry.exchange_code.eq_ignore_ascii_case(&req.exchange_code))
            .map(CatalogEntry::into_listing_entry)
            .collect();

        Ok(ExchangeTickerBatch {
            exchange_code: req.exchange_code.clone(),
            entries,
        })
    }

    async fn fetch_mock_fundamentals(
        &self,
        req: &FundamentalsRequest,
    ) -> Result<Option<FundamentalsPayload>, SourceError> {
        self.execute_get(&format!("{API_BASE}/fundamentals/mock"))
            .await?;

        let code = req.ticker.code();
        let payload = eodhd_catalog()
            .into_iter()
            .find(|entry| entry.code.eq_ignore_ascii_case(code))
            .map(CatalogEntry::into_fundamentals);
        Ok(payload)
    }
}

impl MarketDataSource for EodhdAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Eodhd
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::full()
    }

    fn search<'a>(
        &'a self,
        req: SearchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SearchBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if req.query.trim().is_empty() {
                return Err(SourceError::invalid_request(
                    "eodhd search query must not be empty",
                ));
            }
            if req.limit == 0 {
                return Err(SourceError::invalid_request(
                    "eodhd search limit must be greater than zero",
                ));
            }

            if self.is_real_client() {
                self.execute_real_search(&req).await
            } else {
                self.execute_mock_search(&req).await
            }
        })
    }

    fn exchange_tickers<'a>(
        &'a self,
        req: ExchangeTickersRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ExchangeTickerBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if req.exchange_code.trim().is_empty() {
                return Err(SourceError::invalid_request(
                    "eodhd exchange listing requires an exchange code",
                ));
            }

            if self.is_real_client() {
                self.fetch_real_exchange_tickers(&req).await
            } else {
                self.fetch_mock_exchange_tickers(&req).await
            }
        })
    }

    fn fundamentals<'a>(
        &'a self,
        req: FundamentalsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<FundamentalsPayload>, SourceError>> + Send + 'a>>
    {
        Box::pin(async move {
            if self.is_real_client() {
                self.fetch_real_fundamentals(&req).await
            } else {
                self.fetch_mock_fundamentals(&req).await
            }
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move {
            let mut state = self.health_state;
            let mut rate_available = self.rate_available;

            match self.circuit_breaker.state() {
                CircuitState::Closed => {}
                CircuitState::HalfOpen => {
                    if state == HealthState::Healthy {
                        state = HealthState::Degraded;
                    }
                }
                CircuitState::Open => {
                    state = HealthState::Unhealthy;
                    rate_available = false;
                }
            }

            HealthStatus::new(state, rate_available)
        })
    }
}

struct CatalogEntry {
    code: &'static str,
    name: &'static str,
    exchange_code: &'static str,
    exchange_name: &'static str,
    country: &'static str,
    currency: &'static str,
    kind: &'static str,
    isin: Option<&'static str>,
    sector: &'static str,
    industry: &'static str,
}

impl CatalogEntry {
    fn into_candidate(self) -> SearchCandidate {
        SearchCandidate {
            code: Some(self.code.to_string()),
            name: Some(self.name.to_string()),
            isin: self.isin.map(str::to_string),
            exchange: Some(self.exchange_code.to_string()),
            country: Some(self.country.to_string()),
            currency: Some(self.currency.to_string()),
            kind: Some(self.kind.to_string()),
        }
    }

    fn into_listing_entry(self) -> ExchangeTickerEntry {
        ExchangeTickerEntry {
            code: Some(self.code.to_string()),
            name: Some(self.name.to_string()),
            exchange: Some(self.exchange_name.to_string()),
            country: Some(self.country.to_string()),
            currency: Some(self.currency.to_string()),
            kind: Some(self.kind.to_string()),
        }
    }

    fn into_fundamentals(self) -> FundamentalsPayload {
        FundamentalsPayload {
            general: GeneralInfo {
                name: Some(self.name.to_string()),
                exchange: Some(self.exchange_name.to_string()),
                country_name: Some(self.country.to_string()),
                sector: Some(self.sector.to_string()),
                industry: Some(self.industry.to_string()),
                description: Some(format!("{} company profile.", self.name)),
                currency_code: Some(self.currency.to_string()),
                isin: self.isin.map(str::to_string),
                kind: Some(self.kind.to_string()),
                web_url: Some(format!(
                    "https://www.{}.example.com",
                    self.code.to_ascii_lowercase()
                )),
                logo_url: None,
                fiscal_year_end: Some(String::from("December")),
                listings: None,
                officers: None,
            },
            officers: None,
        }
    }
}

fn eodhd_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            code: "AAPL",
            name: "Apple Inc",
            exchange_code: "US",
            exchange_name: "NASDAQ",
            country: "USA",
            currency: "USD",
            kind: "Common Stock",
            isin: Some("US0378331005"),
            sector: "Technology",
            industry: "Consumer Electronics",
        },
        CatalogEntry {
            code: "MSFT",
            name: "Microsoft Corporation",
            exchange_code: "US",
            exchange_name: "NASDAQ",
            country: "USA",
            currency: "USD",
            kind: "Common Stock",
            isin: Some("US5949181045"),
            sector: "Technology",
            industry: "Software Infrastructure",
        },
        CatalogEntry {
            code: "GLD",
            name: "SPDR Gold Shares",
            exchange_code: "US",
            exchange_name: "NYSE ARCA",
            country: "USA",
            currency: "USD",
            kind: "ETF",
            isin: Some("US78463V1070"),
            sector: "Financial",
            industry: "Exchange Traded Fund",
        },
        CatalogEntry {
            code: "SAP",
            name: "SAP SE",
            exchange_code: "XETRA",
            exchange_name: "XETRA",
            country: "Germany",
            currency: "EUR",
            kind: "Common Stock",
            isin: Some("DE0007164600"),
            sector: "Technology",
            industry: "Software Applications",
        },
        CatalogEntry {
            code: "VWCE",
            name: "Vanguard FTSE All-World UCITS ETF",
            exchange_code: "XETRA",
            exchange_name: "XETRA",
            country: "Germany",
            currency: "EUR",
            kind: "ETF",
            isin: Some("IE00BK5BQT80"),
            sector: "Financial",
            industry: "Exchange Traded Fund",
        },
        CatalogEntry {
            code: "BTC-USD",
            name: "Bitcoin",
            exchange_code: "CC",
            exchange_name: "Cryptocurrencies",
            country: "Unknown",
            currency: "USD",
            kind: "Crypto Currency",
            isin: None,
            sector: "Digital Assets",
            industry: "Cryptocurrency",
        },
    ]
}
