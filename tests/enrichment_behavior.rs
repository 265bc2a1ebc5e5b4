//! Behavior-driven tests for enrichment orchestration.
//!
//! These tests verify HOW assets move through identity resolution, the
//! precedence merge and batch processing, using in-memory doubles for the
//! store and the market data source.

use std::sync::Arc;

use assayer_tests::{
    candidate, full_fundamentals, sparse_asset, AssetRecord, EnrichError, EnrichReport,
    EnrichRequest, EnrichScope, EnrichmentEngine, MemoryStore, OutcomeStatus, RecordingSource,
};

fn engine_with(
    store: Arc<MemoryStore>,
    source: Arc<RecordingSource>,
) -> EnrichmentEngine {
    EnrichmentEngine::new(store, source)
}

// =============================================================================
// Identity resolution
// =============================================================================

#[tokio::test]
async fn when_stored_ticker_exists_then_search_is_skipped() {
    // Given: an asset that already carries a canonical ticker
    let store = Arc::new(MemoryStore::new());
    let mut asset = sparse_asset("a-1", "p-1", "Apple Inc");
    asset.ticker_eod = Some(String::from("AAPL.US"));
    store.seed(asset);

    let source = Arc::new(
        RecordingSource::new(Vec::new())
            .with_fundamentals(full_fundamentals("Apple Inc", "NASDAQ")),
    );
    let engine = engine_with(store.clone(), source.clone());

    // When: the asset is enriched by id
    let request = EnrichRequest {
        asset_id: Some(String::from("a-1")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    let report = engine.run(&request).await.expect("enrichment succeeds");

    // Then: the search index is never consulted, only the context lookups run
    assert_eq!(source.search_count(), 0);
    assert_eq!(source.listing_count(), 1);
    assert_eq!(source.fundamentals_count(), 1);

    let EnrichReport::Single { asset, outcome, matched } = report else {
        panic!("expected single report");
    };
    assert_eq!(outcome.status, OutcomeStatus::Updated);
    assert!(matched.is_none());
    assert_eq!(asset.exchange.as_deref(), Some("NASDAQ"));
}

#[tokio::test]
async fn when_query_matches_name_exactly_then_ticker_resolves_to_code_exchange() {
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Apple Inc"));

    let source = Arc::new(RecordingSource::new(vec![candidate(
        "AAPL",
        "Apple Inc",
        "US",
    )]));
    let engine = engine_with(store.clone(), source.clone());

    let request = EnrichRequest {
        asset_id: Some(String::from("a-1")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    let report = engine.run(&request).await.expect("enrichment succeeds");

    let EnrichReport::Single { asset, matched, .. } = report else {
        panic!("expected single report");
    };
    assert_eq!(asset.ticker_eod.as_deref(), Some("AAPL.US"));
    let matched = matched.expect("search path carries the match");
    assert!((matched.score - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn when_exchange_override_is_set_then_it_wins_over_candidate_exchange() {
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Apple Inc"));

    let source = Arc::new(RecordingSource::new(vec![candidate(
        "AAPL",
        "Apple Inc",
        "US",
    )]));
    let engine = engine_with(store.clone(), source);

    let request = EnrichRequest {
        asset_id: Some(String::from("a-1")),
        exchange: Some(String::from("XETRA")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    let report = engine.run(&request).await.expect("enrichment succeeds");

    let EnrichReport::Single { asset, .. } = report else {
        panic!("expected single report");
    };
    assert_eq!(asset.ticker_eod.as_deref(), Some("AAPL.XETRA"));
    assert_eq!(asset.country.as_deref(), Some("XETRA"));
}

#[tokio::test]
async fn when_no_candidate_clears_the_floor_then_single_enrichment_fails() {
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Quantum Widget Holdings"));

    let source = Arc::new(RecordingSource::new(vec![candidate(
        "XOM",
        "Exxon Mobil",
        "US",
    )]));
    let engine = engine_with(store, source);

    let request = EnrichRequest {
        asset_id: Some(String::from("a-1")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    let error = engine.run(&request).await.expect_err("must fail");
    assert!(matches!(error, EnrichError::NoConfidentMatch { .. }));
}

#[tokio::test]
async fn when_search_is_unavailable_then_it_reads_as_no_confident_match() {
    // Search outages degrade to "no candidates" rather than surfacing a
    // transport error per asset.
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Apple Inc"));

    let source = Arc::new(RecordingSource::new(Vec::new()).with_failing_search());
    let engine = engine_with(store, source);

    let request = EnrichRequest {
        asset_id: Some(String::from("a-1")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    let error = engine.run(&request).await.expect_err("must fail");
    assert!(matches!(error, EnrichError::NoConfidentMatch { .. }));
}

#[tokio::test]
async fn when_gold_is_queried_then_the_exact_name_wins_over_variants() {
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Gold"));

    let source = Arc::new(RecordingSource::new(vec![
        candidate("GLD", "Gold", "US"),
        candidate("GLDX", "Gold Explorer", "US"),
    ]));
    let engine = engine_with(store, source);

    let request = EnrichRequest {
        asset_id: Some(String::from("a-1")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    let report = engine.run(&request).await.expect("enrichment succeeds");

    let EnrichReport::Single { asset, matched, .. } = report else {
        panic!("expected single report");
    };
    assert_eq!(asset.ticker_eod.as_deref(), Some("GLD.US"));
    let matched = matched.expect("search path carries the match");
    assert!((matched.score - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn when_the_name_is_misspelled_then_token_overlap_still_matches() {
    // "Applee Inc" shares one of three distinct tokens with "Apple Inc",
    // which clears the confidence floor as a moderate match.
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Applee Inc"));

    let source = Arc::new(RecordingSource::new(vec![candidate(
        "AAPL",
        "Apple Inc",
        "US",
    )]));
    let engine = engine_with(store, source);

    let request = EnrichRequest {
        asset_id: Some(String::from("a-1")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    let report = engine.run(&request).await.expect("enrichment succeeds");

    let EnrichReport::Single { asset, matched, .. } = report else {
        panic!("expected single report");
    };
    assert_eq!(asset.ticker_eod.as_deref(), Some("AAPL.US"));
    let matched = matched.expect("search path carries the match");
    assert!((matched.score - 1.0 / 3.0).abs() < 1e-9);
}

// =============================================================================
// Merge semantics
// =============================================================================

#[tokio::test]
async fn when_enrichment_merges_then_user_fields_are_untouched() {
    let store = Arc::new(MemoryStore::new());
    let mut asset = sparse_asset("a-1", "p-1", "Apple Inc");
    asset.category = Some(String::from("Long-term"));
    asset.owner_comment = Some(String::from("keep forever"));
    store.seed(asset);

    let source = Arc::new(
        RecordingSource::new(vec![candidate("AAPL", "Apple Inc", "US")])
            .with_fundamentals(full_fundamentals("Apple Inc", "NASDAQ")),
    );
    let engine = engine_with(store.clone(), source);

    let request = EnrichRequest {
        asset_id: Some(String::from("a-1")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    engine.run(&request).await.expect("enrichment succeeds");

    let stored = store.get("a-1").expect("asset present");
    assert_eq!(stored.category.as_deref(), Some("Long-term"));
    assert_eq!(stored.owner_comment.as_deref(), Some("keep forever"));
    assert_eq!(stored.sector.as_deref(), Some("Technology"));
}

#[tokio::test]
async fn when_fundamentals_are_missing_then_candidate_values_fill_the_gaps() {
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Apple Inc"));

    let source = Arc::new(RecordingSource::new(vec![candidate(
        "AAPL",
        "Apple Inc",
        "US",
    )]));
    let engine = engine_with(store.clone(), source);

    let request = EnrichRequest {
        asset_id: Some(String::from("a-1")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    engine.run(&request).await.expect("enrichment succeeds");

    let stored = store.get("a-1").expect("asset present");
    assert_eq!(stored.exchange.as_deref(), Some("US"));
    assert_eq!(stored.country.as_deref(), Some("US"));
    assert_eq!(stored.currency.as_deref(), Some("USD"));
    assert_eq!(stored.sector, None);
}

// =============================================================================
// Batch processing
// =============================================================================

#[tokio::test]
async fn when_batch_reruns_then_fully_enriched_assets_are_skipped_without_calls() {
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Apple Inc"));
    store.seed(sparse_asset("a-2", "p-1", "Apple Hospitality"));

    let source = Arc::new(
        RecordingSource::new(vec![candidate("AAPL", "Apple Inc", "US")])
            .with_fundamentals(full_fundamentals("Apple Inc", "NASDAQ")),
    );
    let engine = engine_with(store.clone(), source.clone());

    let request = EnrichRequest {
        portfolio_id: Some(String::from("p-1")),
        ..EnrichRequest::new(EnrichScope::Portfolio)
    };

    // First run enriches everything.
    let report = engine.run(&request).await.expect("first run succeeds");
    let EnrichReport::Batch(summary) = report else {
        panic!("expected batch report");
    };
    assert_eq!(summary.total, 2);
    assert_eq!(summary.enriched, 2);

    let calls_after_first = (
        source.search_count(),
        source.listing_count(),
        source.fundamentals_count(),
    );

    // Second run skips everything and makes no external calls.
    let report = engine.run(&request).await.expect("second run succeeds");
    let EnrichReport::Batch(summary) = report else {
        panic!("expected batch report");
    };
    assert_eq!(summary.enriched, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(
        (
            source.search_count(),
            source.listing_count(),
            source.fundamentals_count(),
        ),
        calls_after_first
    );
}

#[tokio::test]
async fn when_one_asset_write_fails_then_the_rest_of_the_batch_continues() {
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Apple Inc"));
    store.seed(sparse_asset("a-2", "p-1", "Apple Inc"));
    store.seed(sparse_asset("a-3", "p-1", "Apple Inc"));
    store.fail_writes_for("a-2");

    let source = Arc::new(RecordingSource::new(vec![candidate(
        "AAPL",
        "Apple Inc",
        "US",
    )]));
    let engine = engine_with(store, source);

    let request = EnrichRequest {
        portfolio_id: Some(String::from("p-1")),
        ..EnrichRequest::new(EnrichScope::Portfolio)
    };
    let report = engine.run(&request).await.expect("batch succeeds");

    let EnrichReport::Batch(summary) = report else {
        panic!("expected batch report");
    };
    assert_eq!(summary.total, 3);
    assert_eq!(summary.enriched, 2);
    assert_eq!(summary.errors, 1);

    let failed = summary
        .results
        .iter()
        .find(|outcome| outcome.status == OutcomeStatus::Error)
        .expect("failed outcome present");
    assert_eq!(failed.asset_id.as_deref(), Some("a-2"));
    assert!(failed
        .reason
        .as_deref()
        .is_some_and(|reason| reason.contains("simulated write failure")));
}

#[tokio::test]
async fn when_an_asset_has_no_identity_then_it_is_skipped_with_reason() {
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Apple Inc"));
    store.seed(AssetRecord {
        id: String::from("a-2"),
        portfolio_id: Some(String::from("p-1")),
        ..AssetRecord::default()
    });

    let source = Arc::new(RecordingSource::new(vec![candidate(
        "AAPL",
        "Apple Inc",
        "US",
    )]));
    let engine = engine_with(store, source);

    let request = EnrichRequest {
        portfolio_id: Some(String::from("p-1")),
        ..EnrichRequest::new(EnrichScope::Portfolio)
    };
    let report = engine.run(&request).await.expect("batch succeeds");

    let EnrichReport::Batch(summary) = report else {
        panic!("expected batch report");
    };
    assert_eq!(summary.total, 2);
    assert_eq!(summary.enriched, 1);
    assert_eq!(summary.skipped, 1);

    let skipped = summary
        .results
        .iter()
        .find(|outcome| outcome.status == OutcomeStatus::Skipped)
        .expect("skipped outcome present");
    assert_eq!(skipped.reason.as_deref(), Some("missing query"));
}

#[tokio::test]
async fn when_customer_scope_runs_then_all_linked_portfolios_are_covered() {
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Apple Inc"));
    store.seed(sparse_asset("a-2", "p-2", "Apple Inc"));
    store.link(9, "p-1");
    store.link(9, "p-2");

    let source = Arc::new(RecordingSource::new(vec![candidate(
        "AAPL",
        "Apple Inc",
        "US",
    )]));
    let engine = engine_with(store, source);

    let request = EnrichRequest {
        customer_id: Some(9),
        ..EnrichRequest::new(EnrichScope::Customer)
    };
    let report = engine.run(&request).await.expect("batch succeeds");

    let EnrichReport::Batch(summary) = report else {
        panic!("expected batch report");
    };
    assert_eq!(summary.scope, EnrichScope::Customer);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.enriched, 2);
}

#[tokio::test]
async fn when_customer_has_no_links_then_the_request_fails() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(RecordingSource::new(Vec::new()));
    let engine = engine_with(store, source);

    let request = EnrichRequest {
        customer_id: Some(9),
        ..EnrichRequest::new(EnrichScope::Customer)
    };
    let error = engine.run(&request).await.expect_err("must fail");
    assert!(matches!(error, EnrichError::NoPortfoliosForCustomer(9)));
}

// =============================================================================
// Insert on resolve
// =============================================================================

#[tokio::test]
async fn when_query_misses_the_portfolio_then_a_new_asset_is_inserted() {
    let store = Arc::new(MemoryStore::new());

    let source = Arc::new(
        RecordingSource::new(vec![candidate("AAPL", "Apple Inc", "US")])
            .with_fundamentals(full_fundamentals("Apple Inc", "NASDAQ")),
    );
    let engine = engine_with(store.clone(), source);

    let request = EnrichRequest {
        portfolio_id: Some(String::from("p-1")),
        query: Some(String::from("Apple")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    let report = engine.run(&request).await.expect("enrichment succeeds");

    let EnrichReport::Single { asset, outcome, matched } = report else {
        panic!("expected single report");
    };
    assert_eq!(outcome.status, OutcomeStatus::Inserted);
    assert!(matched.is_some());
    assert_eq!(asset.portfolio_id.as_deref(), Some("p-1"));
    assert_eq!(asset.ticker_eod.as_deref(), Some("AAPL.US"));
    assert_eq!(asset.name.as_deref(), Some("Apple Inc"));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn when_a_ticker_override_accompanies_an_insert_then_the_match_still_runs() {
    let store = Arc::new(MemoryStore::new());

    let source = Arc::new(
        RecordingSource::new(vec![candidate("AAPL", "Apple Inc", "US")])
            .with_fundamentals(full_fundamentals("Apple Inc", "NASDAQ")),
    );
    let engine = engine_with(store.clone(), source.clone());

    let request = EnrichRequest {
        portfolio_id: Some(String::from("p-1")),
        query: Some(String::from("Apple")),
        ticker: Some(String::from("MSFT.US")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    let report = engine.run(&request).await.expect("enrichment succeeds");

    // The inserted record comes from a scored match, never from the
    // ticker override.
    assert_eq!(source.search_count(), 1);

    let EnrichReport::Single { asset, outcome, matched } = report else {
        panic!("expected single report");
    };
    assert_eq!(outcome.status, OutcomeStatus::Inserted);
    assert!(matched.is_some());
    assert_eq!(asset.ticker_eod.as_deref(), Some("AAPL.US"));
}

#[tokio::test]
async fn when_query_matches_an_existing_asset_then_it_is_updated_in_place() {
    let store = Arc::new(MemoryStore::new());
    store.seed(sparse_asset("a-1", "p-1", "Apple Inc"));

    let source = Arc::new(RecordingSource::new(vec![candidate(
        "AAPL",
        "Apple Inc",
        "US",
    )]));
    let engine = engine_with(store.clone(), source);

    let request = EnrichRequest {
        portfolio_id: Some(String::from("p-1")),
        query: Some(String::from("apple")),
        ..EnrichRequest::new(EnrichScope::Single)
    };
    let report = engine.run(&request).await.expect("enrichment succeeds");

    let EnrichReport::Single { asset, outcome, .. } = report else {
        panic!("expected single report");
    };
    assert_eq!(outcome.status, OutcomeStatus::Updated);
    assert_eq!(asset.id, "a-1");
    assert_eq!(store.len(), 1);
}
