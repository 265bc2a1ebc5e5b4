//! Text normalization and candidate scoring.
//!
//! Matching is tiered: exact code or name matches are certain, an ISIN match
//! is near-certain, containment and prefix matches are strong, and anything
//! else falls back to token overlap. Scores below [`CONFIDENCE_FLOOR`] are
//! discarded rather than guessed at.

use std::collections::HashSet;

use serde::Serialize;

use crate::data_source::{MarketDataSource, SearchRequest};
use crate::domain::SearchCandidate;

/// Minimum score a candidate must reach to be used at all.
pub const CONFIDENCE_FLOOR: f64 = 0.25;

/// A candidate paired with its score against a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate: SearchCandidate,
    pub score: f64,
}

/// Lowercases, replaces every non-alphanumeric run with a single space and
/// trims. Non-ASCII characters count as separators, matching the search
/// index's own tokenization.
pub fn normalize_text(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mapped: String = lowered
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Jaccard overlap of the whitespace token sets of two normalized strings.
fn token_overlap(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let shared = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    shared as f64 / union as f64
}

/// Scores one candidate against a raw query string.
pub fn score_match(query: &str, candidate: &SearchCandidate) -> f64 {
    let query_norm = normalize_text(query);
    if query_norm.is_empty() {
        return 0.0;
    }

    let code_norm = normalize_text(candidate.code.as_deref().unwrap_or_default());
    let name_norm = normalize_text(candidate.name.as_deref().unwrap_or_default());
    let isin_norm = normalize_text(candidate.isin.as_deref().unwrap_or_default());

    if !code_norm.is_empty() && code_norm == query_norm {
        return 1.0;
    }
    if !name_norm.is_empty() && name_norm == query_norm {
        return 1.0;
    }
    if !isin_norm.is_empty() && isin_norm == query_norm {
        return 0.98;
    }
    if !name_norm.is_empty() && name_norm.contains(&query_norm) {
        return 0.94;
    }
    if !code_norm.is_empty() && code_norm.starts_with(&query_norm) {
        return 0.90;
    }

    let name_overlap = token_overlap(&query_norm, &name_norm);
    let code_overlap = token_overlap(&query_norm, &code_norm);
    name_overlap.max(code_overlap)
}

/// Scores candidates against a query and sorts best-first.
pub fn score_and_rank(query: &str, candidates: Vec<SearchCandidate>) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| ScoredCandidate {
            score: score_match(query, &candidate),
            candidate,
        })
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

/// Queries the search index and picks the best candidate above the floor.
///
/// A failed or empty search is treated as "no candidates": the caller turns
/// that into a no-confident-match outcome, and no retry happens here.
pub async fn find_best_match(
    source: &dyn MarketDataSource,
    query: &str,
) -> Option<ScoredCandidate> {
    let request = SearchRequest::new(query, SearchRequest::DEFAULT_LIMIT).ok()?;
    let batch = match source.search(request).await {
        Ok(batch) => batch,
        Err(error) => {
            tracing::warn!(query, error = %error, "search index lookup failed");
            return None;
        }
    };

    let best = score_and_rank(query, batch.candidates).into_iter().next()?;
    if best.score < CONFIDENCE_FLOOR {
        return None;
    }
    Some(best)
}
