//! Field-precedence merge builder.
//!
//! Every enrichable string column is described by one [`FieldRoute`]: an
//! ordered list of sources evaluated by the same first-non-blank rule. The
//! table makes the precedence auditable field-by-field instead of burying it
//! in a pile of conditionals. Deliberate routing quirks:
//!
//! - `country` is fed from the resolved exchange CODE, not a country source.
//! - `industry` comes from fundamentals, falling back to the existing value.
//! - `ticker_eod` is always set to the resolved canonical ticker.
//! - `category` and `owner_comment` have no route and are never touched.

use crate::domain::{
    AssetClass, AssetPatch, AssetRecord, CanonicalTicker, ExchangeTickerEntry, FundamentalsPayload,
    GeneralInfo, SearchCandidate,
};

/// Everything the merge builder may draw from for one asset.
#[derive(Debug, Clone, Copy)]
pub struct MergeInputs<'a> {
    pub asset: &'a AssetRecord,
    pub candidate: Option<&'a SearchCandidate>,
    pub ticker: &'a CanonicalTicker,
    pub exchange_code: &'a str,
    pub exchange_entry: Option<&'a ExchangeTickerEntry>,
    pub fundamentals: Option<&'a FundamentalsPayload>,
}

impl<'a> MergeInputs<'a> {
    fn general(&self) -> Option<&'a GeneralInfo> {
        self.fundamentals.map(|payload| &payload.general)
    }
}

/// First value in priority order with non-whitespace content, trimmed.
pub fn pick_value(sources: &[Option<&str>]) -> Option<String> {
    sources.iter().find_map(|source| {
        source.and_then(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
    })
}

struct FieldRoute {
    field: &'static str,
    pick: fn(&MergeInputs<'_>) -> Option<String>,
    store: fn(&mut AssetPatch, Option<String>),
}

const STRING_ROUTES: &[FieldRoute] = &[
    FieldRoute {
        field: "ticker",
        pick: |i| {
            pick_value(&[
                i.candidate.and_then(|c| c.code.as_deref()),
                i.asset.ticker.as_deref(),
            ])
        },
        store: |p, v| p.ticker = v,
    },
    FieldRoute {
        field: "name",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.name.as_deref()),
                i.candidate.and_then(|c| c.name.as_deref()),
                i.asset.name.as_deref(),
            ])
        },
        store: |p, v| p.name = v,
    },
    FieldRoute {
        field: "exchange",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.exchange.as_deref()),
                i.candidate.and_then(|c| c.exchange.as_deref()),
                i.exchange_entry.and_then(|e| e.exchange.as_deref()),
                i.asset.exchange.as_deref(),
            ])
        },
        store: |p, v| p.exchange = v,
    },
    FieldRoute {
        field: "exchange_code",
        pick: |i| pick_value(&[Some(i.exchange_code), i.asset.exchange_code.as_deref()]),
        store: |p, v| p.exchange_code = v,
    },
    FieldRoute {
        // Short exchange codes double as the country marker downstream.
        field: "country",
        pick: |i| pick_value(&[Some(i.exchange_code), i.asset.country.as_deref()]),
        store: |p, v| p.country = v,
    },
    FieldRoute {
        field: "country_name",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.country_name.as_deref()),
                i.candidate.and_then(|c| c.country.as_deref()),
                i.asset.country_name.as_deref(),
            ])
        },
        store: |p, v| p.country_name = v,
    },
    FieldRoute {
        field: "sector",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.sector.as_deref()),
                i.asset.sector.as_deref(),
            ])
        },
        store: |p, v| p.sector = v,
    },
    FieldRoute {
        field: "industry",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.industry.as_deref()),
                i.asset.industry.as_deref(),
            ])
        },
        store: |p, v| p.industry = v,
    },
    FieldRoute {
        field: "description",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.description.as_deref()),
                i.asset.description.as_deref(),
            ])
        },
        store: |p, v| p.description = v,
    },
    FieldRoute {
        field: "currency",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.currency_code.as_deref()),
                i.candidate.and_then(|c| c.currency.as_deref()),
                i.asset.currency.as_deref(),
            ])
        },
        store: |p, v| p.currency = v,
    },
    FieldRoute {
        field: "ticker_eod",
        pick: |i| Some(i.ticker.as_str().to_string()),
        store: |p, v| p.ticker_eod = v,
    },
    FieldRoute {
        field: "isin",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.isin.as_deref()),
                i.candidate.and_then(|c| c.isin.as_deref()),
                i.asset.isin.as_deref(),
            ])
        },
        store: |p, v| p.isin = v,
    },
    FieldRoute {
        field: "website_url",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.web_url.as_deref()),
                i.asset.website_url.as_deref(),
            ])
        },
        store: |p, v| p.website_url = v,
    },
    FieldRoute {
        field: "logo_url",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.logo_url.as_deref()),
                i.asset.logo_url.as_deref(),
            ])
        },
        store: |p, v| p.logo_url = v,
    },
    FieldRoute {
        field: "fiscal_year_end",
        pick: |i| {
            pick_value(&[
                i.general().and_then(|g| g.fiscal_year_end.as_deref()),
                i.asset.fiscal_year_end.as_deref(),
            ])
        },
        store: |p, v| p.fiscal_year_end = v,
    },
];

/// Column names the route table writes to. `category` and `owner_comment`
/// are absent by design.
pub fn routed_fields() -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = STRING_ROUTES.iter().map(|route| route.field).collect();
    fields.extend(["officers", "other_listings", "asset_class"]);
    fields
}

/// Builds the enrichment patch for one asset from the gathered inputs.
pub fn build_asset_patch(inputs: &MergeInputs<'_>) -> AssetPatch {
    let mut patch = AssetPatch::default();

    for route in STRING_ROUTES {
        (route.store)(&mut patch, (route.pick)(inputs));
    }

    patch.officers = inputs
        .fundamentals
        .and_then(|payload| payload.officers())
        .or(inputs.asset.officers.as_ref())
        .cloned();
    patch.other_listings = inputs
        .general()
        .and_then(|general| general.listings.as_ref())
        .or(inputs.asset.other_listings.as_ref())
        .cloned();
    patch.asset_class = Some(resolve_asset_class(inputs));

    patch
}

/// Instrument-type signal preference: fundamentals, then the matched
/// candidate, then the already-stored class, then `Stocks`.
fn resolve_asset_class(inputs: &MergeInputs<'_>) -> AssetClass {
    let signal = pick_value(&[
        inputs.general().and_then(|g| g.kind.as_deref()),
        inputs.candidate.and_then(|c| c.kind.as_deref()),
    ]);
    signal
        .as_deref()
        .and_then(AssetClass::from_signal)
        .or(inputs.asset.asset_class)
        .unwrap_or(AssetClass::Stocks)
}
