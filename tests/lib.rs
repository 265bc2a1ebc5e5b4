//! Test library shared by the behavior suites.
//!
//! Provides in-memory doubles for the store and the market data source so
//! enrichment behavior can be exercised without a database or network.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub use assayer_core::{
    domain::{
        AssetClass, AssetPatch, AssetRecord, CanonicalTicker, ExchangeTickerEntry,
        FundamentalsPayload, GeneralInfo, SearchCandidate,
    },
    AssetStore, EnrichError, EnrichReport, EnrichRequest, EnrichScope, EnrichmentEngine,
    OutcomeStatus, StoreError,
};
use assayer_core::{
    CapabilitySet, ExchangeTickerBatch, ExchangeTickersRequest, FundamentalsRequest, HealthStatus,
    MarketDataSource, ProviderId, SearchBatch, SearchRequest, SourceError,
};

/// In-memory [`AssetStore`] double. Writes to ids registered through
/// [`MemoryStore::fail_writes_for`] fail, which lets tests exercise
/// partial-failure isolation.
#[derive(Default)]
pub struct MemoryStore {
    assets: Mutex<HashMap<String, AssetRecord>>,
    links: Mutex<Vec<(i64, String)>>,
    failing_writes: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, asset: AssetRecord) {
        self.assets
            .lock()
            .expect("assets lock")
            .insert(asset.id.clone(), asset);
    }

    pub fn link(&self, customer_id: i64, portfolio_id: &str) {
        self.links
            .lock()
            .expect("links lock")
            .push((customer_id, portfolio_id.to_string()));
    }

    pub fn fail_writes_for(&self, id: &str) {
        self.failing_writes
            .lock()
            .expect("failing lock")
            .insert(id.to_string());
    }

    pub fn get(&self, id: &str) -> Option<AssetRecord> {
        self.assets.lock().expect("assets lock").get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.assets.lock().expect("assets lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetStore for MemoryStore {
    fn load_asset(&self, id: &str) -> Result<Option<AssetRecord>, StoreError> {
        Ok(self.get(id))
    }

    fn load_assets_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<AssetRecord>, StoreError> {
        let mut assets: Vec<AssetRecord> = self
            .assets
            .lock()
            .expect("assets lock")
            .values()
            .filter(|asset| asset.portfolio_id.as_deref() == Some(portfolio_id))
            .cloned()
            .collect();
        assets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(assets)
    }

    fn load_assets_by_company(&self, company_id: i64) -> Result<Vec<AssetRecord>, StoreError> {
        let mut assets: Vec<AssetRecord> = self
            .assets
            .lock()
            .expect("assets lock")
            .values()
            .filter(|asset| asset.company_id == Some(company_id))
            .cloned()
            .collect();
        assets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(assets)
    }

    fn load_portfolio_ids_for_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<String>, StoreError> {
        let mut portfolio_ids: Vec<String> = self
            .links
            .lock()
            .expect("links lock")
            .iter()
            .filter(|(id, _)| *id == customer_id)
            .map(|(_, portfolio_id)| portfolio_id.clone())
            .collect();
        portfolio_ids.sort();
        portfolio_ids.dedup();
        Ok(portfolio_ids)
    }

    fn find_asset_in_portfolio(
        &self,
        portfolio_id: &str,
        query: &str,
    ) -> Result<Option<AssetRecord>, StoreError> {
        let needle = query.trim().to_lowercase();
        let matches_needle = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        };

        let mut assets = self.load_assets_by_portfolio(portfolio_id)?;
        assets.retain(|asset| {
            matches_needle(&asset.name) || matches_needle(&asset.ticker) || matches_needle(&asset.isin)
        });
        Ok(assets.into_iter().next())
    }

    fn upsert_asset(&self, id: &str, patch: &AssetPatch) -> Result<AssetRecord, StoreError> {
        if self.failing_writes.lock().expect("failing lock").contains(id) {
            return Err(StoreError::Write(format!("simulated write failure for '{id}'")));
        }

        let mut assets = self.assets.lock().expect("assets lock");
        let record = assets
            .get_mut(id)
            .ok_or_else(|| StoreError::MissingRow(id.to_string()))?;
        record.apply_patch(patch);
        Ok(record.clone())
    }

    fn insert_asset(&self, record: &AssetRecord) -> Result<AssetRecord, StoreError> {
        self.seed(record.clone());
        Ok(record.clone())
    }
}

/// [`MarketDataSource`] double with programmed responses and call counters.
pub struct RecordingSource {
    candidates: Vec<SearchCandidate>,
    listing: Vec<ExchangeTickerEntry>,
    fundamentals: Option<FundamentalsPayload>,
    fail_search: bool,
    pub search_calls: AtomicUsize,
    pub listing_calls: AtomicUsize,
    pub fundamentals_calls: AtomicUsize,
}

impl RecordingSource {
    pub fn new(candidates: Vec<SearchCandidate>) -> Self {
        Self {
            candidates,
            listing: Vec::new(),
            fundamentals: None,
            fail_search: false,
            search_calls: AtomicUsize::new(0),
            listing_calls: AtomicUsize::new(0),
            fundamentals_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_listing(mut self, listing: Vec<ExchangeTickerEntry>) -> Self {
        self.listing = listing;
        self
    }

    pub fn with_fundamentals(mut self, fundamentals: FundamentalsPayload) -> Self {
        self.fundamentals = Some(fundamentals);
        self
    }

    pub fn with_failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn search_count(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn listing_count(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn fundamentals_count(&self) -> usize {
        self.fundamentals_calls.load(Ordering::SeqCst)
    }
}

impl MarketDataSource for RecordingSource {
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
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_search {
                return Err(SourceError::unavailable("programmed search outage"));
            }
            Ok(SearchBatch {
                query: req.query,
                candidates: self.candidates.clone(),
            })
        })
    }

    fn exchange_tickers<'a>(
        &'a self,
        req: ExchangeTickersRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ExchangeTickerBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            self.listing_calls.fetch_add(1, Ordering::SeqCst);
            Ok(ExchangeTickerBatch {
                exchange_code: req.exchange_code,
                entries: self.listing.clone(),
            })
        })
    }

    fn fundamentals<'a>(
        &'a self,
        _req: FundamentalsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<FundamentalsPayload>, SourceError>> + Send + 'a>>
    {
        Box::pin(async move {
            self.fundamentals_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.fundamentals.clone())
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move { HealthStatus::healthy() })
    }
}

/// A minimal asset with only a name, the shape enrichment usually starts
/// from.
pub fn sparse_asset(id: &str, portfolio_id: &str, name: &str) -> AssetRecord {
    AssetRecord {
        id: id.to_string(),
        portfolio_id: Some(portfolio_id.to_string()),
        name: Some(name.to_string()),
        ..AssetRecord::default()
    }
}

/// A candidate as the provider search index would return it.
pub fn candidate(code: &str, name: &str, exchange: &str) -> SearchCandidate {
    SearchCandidate {
        code: Some(code.to_string()),
        name: Some(name.to_string()),
        isin: None,
        exchange: Some(exchange.to_string()),
        country: Some(String::from("USA")),
        currency: Some(String::from("USD")),
        kind: Some(String::from("Common Stock")),
    }
}

/// A fundamentals payload that fills every enrichment completeness field.
pub fn full_fundamentals(name: &str, exchange: &str) -> FundamentalsPayload {
    FundamentalsPayload {
        general: GeneralInfo {
            name: Some(name.to_string()),
            exchange: Some(exchange.to_string()),
            country_name: Some(String::from("USA")),
            sector: Some(String::from("Technology")),
            industry: Some(String::from("Consumer Electronics")),
            description: Some(format!("{name} company profile.")),
            currency_code: Some(String::from("USD")),
            isin: None,
            kind: Some(String::from("Common Stock")),
            web_url: Some(String::from("https://example.com")),
            logo_url: None,
            fiscal_year_end: Some(String::from("September")),
            listings: None,
            officers: None,
        },
        officers: None,
    }
}
