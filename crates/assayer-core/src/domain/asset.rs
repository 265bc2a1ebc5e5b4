//! Asset records and enrichment patches.
//!
//! An [`AssetRecord`] is the persisted shape of a portfolio asset: a mix of
//! identity fields, user-owned fields and provider-enrichable fields. An
//! [`AssetPatch`] is the output of the merge builder; it deliberately has no
//! slot for identity fields, `category` or `owner_comment`, so enrichment can
//! never touch them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coarse asset-class bucket stored on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    Crypto,
    Stocks,
    #[serde(rename = "ETF")]
    Etf,
    Funds,
    Other,
}

impl AssetClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crypto => "Crypto",
            Self::Stocks => "Stocks",
            Self::Etf => "ETF",
            Self::Funds => "Funds",
            Self::Other => "Other",
        }
    }

    /// Parses the stored string form. Unknown strings map to `None`.
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "Crypto" => Some(Self::Crypto),
            "Stocks" => Some(Self::Stocks),
            "ETF" => Some(Self::Etf),
            "Funds" => Some(Self::Funds),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Classifies a provider instrument-type signal into a bucket.
    ///
    /// Substring checks run in priority order on the lowercased text, so
    /// "Crypto Currency" wins over "Currency" and "ETF Fund" is an ETF.
    /// Returns `None` when the signal is blank.
    pub fn from_signal(signal: &str) -> Option<Self> {
        let lowered = signal.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        if lowered.contains("crypto") {
            Some(Self::Crypto)
        } else if lowered.contains("etf") {
            Some(Self::Etf)
        } else if lowered.contains("fund") {
            Some(Self::Funds)
        } else if lowered.contains("index") {
            Some(Self::Other)
        } else {
            Some(Self::Stocks)
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted portfolio asset row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    pub portfolio_id: Option<String>,
    pub company_id: Option<i64>,
    pub ticker: Option<String>,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub exchange_code: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub category: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub officers: Option<Value>,
    pub owner_comment: Option<String>,
    pub currency: Option<String>,
    pub ticker_eod: Option<String>,
    pub isin: Option<String>,
    pub asset_class: Option<AssetClass>,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub fiscal_year_end: Option<String>,
    pub other_listings: Option<Value>,
    pub watchlist: bool,
}

/// Fields whose presence marks a record as fully enriched.
pub const ENRICHED_FIELDS: [&str; 8] = [
    "ticker_eod",
    "name",
    "exchange",
    "country",
    "industry",
    "description",
    "sector",
    "website_url",
];

impl AssetRecord {
    /// A bare record anchored to a portfolio, used by insert-on-resolve.
    pub fn blank(id: impl Into<String>, portfolio_id: Option<String>, company_id: Option<i64>) -> Self {
        Self {
            id: id.into(),
            portfolio_id,
            company_id,
            ..Self::default()
        }
    }

    /// True when every completeness field holds a non-blank value.
    pub fn is_fully_enriched(&self) -> bool {
        [
            &self.ticker_eod,
            &self.name,
            &self.exchange,
            &self.country,
            &self.industry,
            &self.description,
            &self.sector,
            &self.website_url,
        ]
        .into_iter()
        .all(|field| has_text(field.as_deref()))
    }

    /// Applies a patch in place. Slots the patch left empty are not touched.
    pub fn apply_patch(&mut self, patch: &AssetPatch) {
        apply_text(&mut self.ticker, &patch.ticker);
        apply_text(&mut self.name, &patch.name);
        apply_text(&mut self.exchange, &patch.exchange);
        apply_text(&mut self.exchange_code, &patch.exchange_code);
        apply_text(&mut self.country, &patch.country);
        apply_text(&mut self.country_name, &patch.country_name);
        apply_text(&mut self.sector, &patch.sector);
        apply_text(&mut self.industry, &patch.industry);
        apply_text(&mut self.description, &patch.description);
        apply_text(&mut self.currency, &patch.currency);
        apply_text(&mut self.ticker_eod, &patch.ticker_eod);
        apply_text(&mut self.isin, &patch.isin);
        apply_text(&mut self.website_url, &patch.website_url);
        apply_text(&mut self.logo_url, &patch.logo_url);
        apply_text(&mut self.fiscal_year_end, &patch.fiscal_year_end);
        if let Some(officers) = &patch.officers {
            self.officers = Some(officers.clone());
        }
        if let Some(listings) = &patch.other_listings {
            self.other_listings = Some(listings.clone());
        }
        if let Some(class) = patch.asset_class {
            self.asset_class = Some(class);
        }
    }
}

/// Enrichment output applied to a record.
///
/// By construction this type cannot express changes to `id`, `portfolio_id`,
/// `company_id`, `category` or `owner_comment`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetPatch {
    pub ticker: Option<String>,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub exchange_code: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub officers: Option<Value>,
    pub currency: Option<String>,
    pub ticker_eod: Option<String>,
    pub isin: Option<String>,
    pub asset_class: Option<AssetClass>,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub fiscal_year_end: Option<String>,
    pub other_listings: Option<Value>,
}

pub(crate) fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

fn apply_text(slot: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *slot = Some(value.clone());
    }
}
