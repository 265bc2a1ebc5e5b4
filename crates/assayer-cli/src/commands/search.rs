use serde::Serialize;
use serde_json::Value;

use assayer_core::{
    score_and_rank, EnrichError, EnrichmentEngine, MarketDataSource, ScoredCandidate,
    SearchRequest,
};

use crate::cli::SearchArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SearchResponseData {
    query: String,
    results: Vec<ScoredCandidate>,
}

pub async fn run(args: &SearchArgs, engine: &EnrichmentEngine) -> Result<Value, CliError> {
    if args.limit == 0 {
        return Err(CliError::Command(String::from(
            "--limit must be greater than zero",
        )));
    }

    let query = args.query.trim();
    if query.is_empty() {
        return Err(CliError::Command(String::from("query must not be empty")));
    }

    let request =
        SearchRequest::new(query, args.limit).map_err(|error| CliError::Command(error.to_string()))?;
    let batch = engine
        .source()
        .search(request)
        .await
        .map_err(EnrichError::from)?;

    let data = SearchResponseData {
        query: batch.query,
        results: score_and_rank(query, batch.candidates),
    };
    Ok(serde_json::to_value(data)?)
}
