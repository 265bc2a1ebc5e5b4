//! Request dispatch and batch orchestration.
//!
//! Batch scopes run a bounded worker pool: assets are processed in waves of
//! `concurrency` (default 1, i.e. strictly sequential) and every per-asset
//! failure is captured as an outcome instead of aborting the run. Only
//! request-boundary errors (validation, empty scopes) propagate.

use uuid::Uuid;

use crate::domain::{has_text, AssetRecord};
use crate::enrich::{EnrichOverrides, EnrichmentEngine};
use crate::error::EnrichError;
use crate::request::{
    BatchSummary, EnrichOutcome, EnrichReport, EnrichRequest, EnrichScope, OutcomeStatus,
};
use crate::store::AssetStore;

impl EnrichmentEngine {
    /// Runs one enrichment request to completion.
    ///
    /// # Errors
    ///
    /// Validation and not-found errors abort the request. In single scope,
    /// per-asset failures (no confident match, bad ticker shape, store
    /// failures) also surface as errors; batch scopes fold them into the
    /// summary instead.
    pub async fn run(&self, request: &EnrichRequest) -> Result<EnrichReport, EnrichError> {
        match request.scope {
            EnrichScope::Single => self.run_single(request).await,
            EnrichScope::Portfolio => self.run_portfolio(request).await,
            EnrichScope::Company => self.run_company(request).await,
            EnrichScope::Customer => self.run_customer(request).await,
        }
    }

    async fn run_single(&self, request: &EnrichRequest) -> Result<EnrichReport, EnrichError> {
        if let Some(asset_id) = &request.asset_id {
            // The ticker override only applies to an asset addressed by id.
            let overrides = EnrichOverrides {
                query: request.query.as_deref(),
                exchange: request.exchange.as_deref(),
                ticker: request.ticker.as_deref(),
            };
            let asset = self
                .store()
                .load_asset(asset_id)?
                .ok_or_else(|| EnrichError::AssetNotFound(asset_id.clone()))?;

            let enriched = self.enrich_step(&asset, overrides).await?;
            let updated = self.store().upsert_asset(&asset.id, &enriched.patch)?;

            let mut outcome = EnrichOutcome::for_asset(&updated, OutcomeStatus::Updated);
            if let Some(matched) = &enriched.matched {
                outcome = outcome.with_score(matched.score);
            }
            return Ok(EnrichReport::Single {
                asset: updated,
                outcome,
                matched: enriched.matched,
            });
        }

        // No asset id: look the query up within a portfolio and insert a new
        // record when nothing matches. Resolution by query always goes
        // through the search index, so no ticker override is forwarded.
        let overrides = EnrichOverrides {
            query: request.query.as_deref(),
            exchange: request.exchange.as_deref(),
            ticker: None,
        };
        let portfolio_id = request.portfolio_id.as_deref().ok_or(
            EnrichError::MissingScopeId {
                scope: EnrichScope::Single,
                field: "asset_id or portfolio_id",
            },
        )?;
        let query = request
            .query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or(EnrichError::MissingScopeId {
                scope: EnrichScope::Single,
                field: "query",
            })?;

        if let Some(asset) = self.store().find_asset_in_portfolio(portfolio_id, query)? {
            let enriched = self.enrich_step(&asset, overrides).await?;
            let updated = self.store().upsert_asset(&asset.id, &enriched.patch)?;

            let mut outcome = EnrichOutcome::for_asset(&updated, OutcomeStatus::Updated);
            if let Some(matched) = &enriched.matched {
                outcome = outcome.with_score(matched.score);
            }
            return Ok(EnrichReport::Single {
                asset: updated,
                outcome,
                matched: enriched.matched,
            });
        }

        let mut record = AssetRecord::blank(
            Uuid::new_v4().to_string(),
            Some(portfolio_id.to_string()),
            request.company_id,
        );
        let enriched = self.enrich_step(&record, overrides).await?;
        record.apply_patch(&enriched.patch);
        if !has_text(record.name.as_deref()) {
            record.name = Some(query.to_string());
        }

        let inserted = self.store().insert_asset(&record)?;
        tracing::info!(
            asset_id = %inserted.id,
            portfolio_id,
            ticker = %enriched.resolved.ticker,
            "inserted asset resolved from query"
        );

        let mut outcome = EnrichOutcome::for_asset(&inserted, OutcomeStatus::Inserted);
        if let Some(matched) = &enriched.matched {
            outcome = outcome.with_score(matched.score);
        }
        Ok(EnrichReport::Single {
            asset: inserted,
            outcome,
            matched: enriched.matched,
        })
    }

    async fn run_portfolio(&self, request: &EnrichRequest) -> Result<EnrichReport, EnrichError> {
        let portfolio_id = request.portfolio_id.as_deref().ok_or(
            EnrichError::MissingScopeId {
                scope: EnrichScope::Portfolio,
                field: "portfolio_id",
            },
        )?;

        let assets = self.store().load_assets_by_portfolio(portfolio_id)?;
        if assets.is_empty() {
            return Err(EnrichError::NoAssetsInScope {
                scope: EnrichScope::Portfolio,
                id: portfolio_id.to_string(),
            });
        }

        self.process_batch(EnrichScope::Portfolio, assets, request)
            .await
    }

    async fn run_company(&self, request: &EnrichRequest) -> Result<EnrichReport, EnrichError> {
        let company_id = request.company_id.ok_or(EnrichError::MissingScopeId {
            scope: EnrichScope::Company,
            field: "company_id",
        })?;

        let assets = self.store().load_assets_by_company(company_id)?;
        if assets.is_empty() {
            return Err(EnrichError::NoAssetsInScope {
                scope: EnrichScope::Company,
                id: company_id.to_string(),
            });
        }

        self.process_batch(EnrichScope::Company, assets, request)
            .await
    }

    async fn run_customer(&self, request: &EnrichRequest) -> Result<EnrichReport, EnrichError> {
        // A customer profile is keyed by customer id, falling back to the
        // company id when no dedicated customer id is supplied.
        let customer_id = request.customer_id.or(request.company_id).ok_or(
            EnrichError::MissingScopeId {
                scope: EnrichScope::Customer,
                field: "customer_id or company_id",
            },
        )?;

        let portfolio_ids = self.store().load_portfolio_ids_for_customer(customer_id)?;
        if portfolio_ids.is_empty() {
            return Err(EnrichError::NoPortfoliosForCustomer(customer_id));
        }

        let mut assets = Vec::new();
        for portfolio_id in &portfolio_ids {
            assets.extend(self.store().load_assets_by_portfolio(portfolio_id)?);
        }
        if assets.is_empty() {
            return Err(EnrichError::NoAssetsInScope {
                scope: EnrichScope::Customer,
                id: customer_id.to_string(),
            });
        }

        self.process_batch(EnrichScope::Customer, assets, request)
            .await
    }

    async fn process_batch(
        &self,
        scope: EnrichScope,
        assets: Vec<AssetRecord>,
        request: &EnrichRequest,
    ) -> Result<EnrichReport, EnrichError> {
        let options = request.batch_options();
        let overrides = EnrichOverrides {
            query: None,
            exchange: request.exchange.as_deref(),
            ticker: None,
        };

        tracing::info!(
            %scope,
            total = assets.len(),
            skip_enriched = options.skip_enriched,
            concurrency = options.concurrency.get(),
            "starting batch enrichment"
        );

        let mut results = Vec::with_capacity(assets.len());
        for wave in assets.chunks(options.concurrency.get()) {
            let outcomes = futures::future::join_all(
                wave.iter()
                    .map(|asset| self.process_one(asset, overrides, options.skip_enriched)),
            )
            .await;
            results.extend(outcomes);
        }

        let summary = BatchSummary::from_outcomes(scope, results);
        tracing::info!(
            %scope,
            enriched = summary.enriched,
            skipped = summary.skipped,
            errors = summary.errors,
            "batch enrichment finished"
        );
        Ok(EnrichReport::Batch(summary))
    }

    /// One asset within a batch. Never fails; every failure becomes an
    /// outcome so the rest of the batch keeps going.
    async fn process_one(
        &self,
        asset: &AssetRecord,
        overrides: EnrichOverrides<'_>,
        skip_enriched: bool,
    ) -> EnrichOutcome {
        if skip_enriched && asset.is_fully_enriched() {
            return EnrichOutcome::for_asset(asset, OutcomeStatus::Skipped);
        }

        let enriched = match self.enrich_step(asset, overrides).await {
            Ok(enriched) => enriched,
            Err(EnrichError::MissingQuery) => {
                return EnrichOutcome::for_asset(asset, OutcomeStatus::Skipped)
                    .with_reason("missing query");
            }
            Err(error) => {
                tracing::warn!(asset_id = %asset.id, error = %error, "asset enrichment failed");
                return EnrichOutcome::for_asset(asset, OutcomeStatus::Error)
                    .with_reason(error.to_string());
            }
        };

        match self.store().upsert_asset(&asset.id, &enriched.patch) {
            Ok(updated) => {
                let mut outcome = EnrichOutcome::for_asset(&updated, OutcomeStatus::Updated);
                if let Some(matched) = &enriched.matched {
                    outcome = outcome.with_score(matched.score);
                }
                outcome
            }
            Err(error) => {
                tracing::warn!(asset_id = %asset.id, error = %error, "asset write failed");
                EnrichOutcome::for_asset(asset, OutcomeStatus::Error)
                    .with_reason(error.to_string())
            }
        }
    }
}
