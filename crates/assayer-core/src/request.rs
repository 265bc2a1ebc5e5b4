//! Enrichment invocation surface: requests, per-asset outcomes and reports.

use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::domain::AssetRecord;
use crate::matching::ScoredCandidate;

/// What set of assets a request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichScope {
    Single,
    Portfolio,
    Company,
    Customer,
}

impl EnrichScope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Portfolio => "portfolio",
            Self::Company => "company",
            Self::Customer => "customer",
        }
    }
}

impl Display for EnrichScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Batch processing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Skip assets that already carry every completeness field.
    pub skip_enriched: bool,
    /// Worker-pool width. The default of 1 preserves strictly sequential
    /// processing; higher values process assets in waves of this size.
    pub concurrency: NonZeroUsize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            skip_enriched: true,
            concurrency: NonZeroUsize::MIN,
        }
    }
}

/// One enrichment request, any scope.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichRequest {
    pub scope: EnrichScope,
    pub asset_id: Option<String>,
    pub portfolio_id: Option<String>,
    pub company_id: Option<i64>,
    pub customer_id: Option<i64>,
    /// Free-text query override; also the lookup key for insert-on-resolve.
    pub query: Option<String>,
    /// Exchange-code override applied to every asset in the request.
    pub exchange: Option<String>,
    /// Canonical ticker override; honored only when `asset_id` addresses
    /// the record. Query resolution always runs the search index.
    pub ticker: Option<String>,
    pub skip_enriched: Option<bool>,
    pub concurrency: Option<NonZeroUsize>,
}

impl EnrichRequest {
    pub fn new(scope: EnrichScope) -> Self {
        Self {
            scope,
            asset_id: None,
            portfolio_id: None,
            company_id: None,
            customer_id: None,
            query: None,
            exchange: None,
            ticker: None,
            skip_enriched: None,
            concurrency: None,
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        let defaults = BatchOptions::default();
        BatchOptions {
            skip_enriched: self.skip_enriched.unwrap_or(defaults.skip_enriched),
            concurrency: self.concurrency.unwrap_or(defaults.concurrency),
        }
    }
}

/// Terminal status of one asset within a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Updated,
    Inserted,
    Skipped,
    Error,
}

/// Per-asset result line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichOutcome {
    pub asset_id: Option<String>,
    pub portfolio_id: Option<String>,
    pub name: Option<String>,
    pub ticker_eod: Option<String>,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Match confidence, present on the search path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl EnrichOutcome {
    pub fn for_asset(asset: &AssetRecord, status: OutcomeStatus) -> Self {
        Self {
            asset_id: Some(asset.id.clone()),
            portfolio_id: asset.portfolio_id.clone(),
            name: asset.name.clone(),
            ticker_eod: asset.ticker_eod.clone(),
            status,
            reason: None,
            score: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Aggregated result of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub scope: EnrichScope,
    pub total: usize,
    pub enriched: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub errors: usize,
    pub results: Vec<EnrichOutcome>,
}

impl BatchSummary {
    /// Folds per-asset outcomes into counters.
    pub fn from_outcomes(scope: EnrichScope, results: Vec<EnrichOutcome>) -> Self {
        let mut summary = Self {
            scope,
            total: results.len(),
            enriched: 0,
            inserted: 0,
            skipped: 0,
            errors: 0,
            results,
        };
        for outcome in &summary.results {
            match outcome.status {
                OutcomeStatus::Updated => summary.enriched += 1,
                OutcomeStatus::Inserted => summary.inserted += 1,
                OutcomeStatus::Skipped => summary.skipped += 1,
                OutcomeStatus::Error => summary.errors += 1,
            }
        }
        summary
    }
}

/// Result of an enrichment request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnrichReport {
    /// Single scope: the refreshed record plus its outcome. The matched
    /// candidate is carried when the search path ran.
    Single {
        asset: AssetRecord,
        outcome: EnrichOutcome,
        #[serde(skip_serializing_if = "Option::is_none")]
        matched: Option<ScoredCandidate>,
    },
    Batch(BatchSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_defaults_are_sequential_and_skipping() {
        let options = BatchOptions::default();
        assert!(options.skip_enriched);
        assert_eq!(options.concurrency.get(), 1);
    }

    #[test]
    fn request_overrides_replace_defaults() {
        let request = EnrichRequest {
            skip_enriched: Some(false),
            concurrency: NonZeroUsize::new(4),
            ..EnrichRequest::new(EnrichScope::Portfolio)
        };
        let options = request.batch_options();
        assert!(!options.skip_enriched);
        assert_eq!(options.concurrency.get(), 4);
    }

    #[test]
    fn summary_counts_follow_outcome_statuses() {
        let outcome = |status| EnrichOutcome {
            asset_id: None,
            portfolio_id: None,
            name: None,
            ticker_eod: None,
            status,
            reason: None,
            score: None,
        };
        let summary = BatchSummary::from_outcomes(
            EnrichScope::Portfolio,
            vec![
                outcome(OutcomeStatus::Updated),
                outcome(OutcomeStatus::Updated),
                outcome(OutcomeStatus::Skipped),
                outcome(OutcomeStatus::Error),
            ],
        );
        assert_eq!(summary.total, 4);
        assert_eq!(summary.enriched, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.inserted, 0);
    }
}
