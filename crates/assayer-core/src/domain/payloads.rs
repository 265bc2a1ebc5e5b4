//! Provider payload shapes.
//!
//! These structs mirror the EODHD JSON documents. Field aliases cover the
//! spelling drift seen across endpoints (`Code`/`Ticker`, `ISIN`/`Isin`,
//! `WebURL`/`Website`/`WebsiteURL`, `LogoURL`/`Logo`,
//! `Listings`/`OtherListings`); every field is optional because real
//! documents are sparse.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the search index response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    #[serde(rename = "Code", alias = "Ticker", default)]
    pub code: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "ISIN", alias = "Isin", default)]
    pub isin: Option<String>,
    #[serde(rename = "Exchange", default)]
    pub exchange: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
    #[serde(rename = "Currency", default)]
    pub currency: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
}

/// One row of an exchange symbol listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeTickerEntry {
    #[serde(rename = "Code", default)]
    pub code: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Display name of the venue, distinct from the short exchange code.
    #[serde(rename = "Exchange", default)]
    pub exchange: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
    #[serde(rename = "Currency", default)]
    pub currency: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
}

/// Fundamentals document for one canonical ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsPayload {
    #[serde(rename = "General", default)]
    pub general: GeneralInfo,
    /// Some documents carry officers at the top level instead of `General`.
    #[serde(rename = "Officers", default)]
    pub officers: Option<Value>,
}

impl FundamentalsPayload {
    /// Officers block, preferring the `General` placement.
    pub fn officers(&self) -> Option<&Value> {
        self.general.officers.as_ref().or(self.officers.as_ref())
    }
}

/// The `General` section of a fundamentals document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralInfo {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Exchange", default)]
    pub exchange: Option<String>,
    #[serde(rename = "CountryName", default)]
    pub country_name: Option<String>,
    #[serde(rename = "Sector", default)]
    pub sector: Option<String>,
    #[serde(rename = "Industry", default)]
    pub industry: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Officers", default)]
    pub officers: Option<Value>,
    #[serde(rename = "CurrencyCode", default)]
    pub currency_code: Option<String>,
    #[serde(rename = "ISIN", alias = "Isin", default)]
    pub isin: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "WebURL", alias = "Website", alias = "WebsiteURL", default)]
    pub web_url: Option<String>,
    #[serde(rename = "LogoURL", alias = "Logo", default)]
    pub logo_url: Option<String>,
    #[serde(rename = "FiscalYearEnd", default)]
    pub fiscal_year_end: Option<String>,
    #[serde(rename = "Listings", alias = "OtherListings", default)]
    pub listings: Option<Value>,
}
